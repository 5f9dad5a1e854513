//! output formatting utilities for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::io::IsTerminal;

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !std::io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

/// JSON-RPC 2.0 error object
#[derive(Serialize)]
pub struct RpcError {
    /// error code (ccond exit codes, offset by -32000 for app-specific errors)
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// additional error data
#[derive(Serialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl JsonRpcError {
    /// create error with standard JSON-RPC error code range
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: None,
            },
            id: None,
        }
    }

    pub fn with_data(
        code: i32,
        message: impl Into<String>,
        suggestions: Vec<String>,
        details: Vec<String>,
    ) -> Self {
        let non_empty = |v: Vec<String>| if v.is_empty() { None } else { Some(v) };
        let suggestions = non_empty(suggestions);
        let details = non_empty(details);

        let mut error = Self::new(code, message);
        if suggestions.is_some() || details.is_some() {
            error.error.data = Some(ErrorData {
                suggestions,
                details,
            });
        }
        error
    }
}

/// convert ccond exit code to JSON-RPC error code
/// JSON-RPC reserves -32000 to -32099 for server/application errors
fn to_jsonrpc_code(code: i32) -> i32 {
    -32000 - code
}

// ============================================================================
// Result data structures for each command
// ============================================================================

/// result data for check command
#[derive(Serialize)]
pub struct CheckData {
    pub path: String,
    pub containers: usize,
    pub errors: Vec<String>,
}

/// one container decision for eval command
#[derive(Serialize)]
pub struct DecisionData {
    pub container: String,
    pub outcome: &'static str,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// registered condition type for types command
#[derive(Serialize)]
pub struct TypeData {
    pub tag: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub fact: &'static str,
    pub description: &'static str,
}

/// translated container for show command
#[derive(Serialize)]
pub struct ShowData {
    pub container: String,
    pub tree: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<JsonValue>,
}

// ============================================================================
// Output functions
// ============================================================================

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

/// print an error in the given mode: JSON-RPC on stdout or text on stderr
pub fn print_error(
    mode: OutputMode,
    code: i32,
    message: &str,
    suggestions: Vec<String>,
    details: Vec<String>,
) {
    if mode.is_json() {
        let error = JsonRpcError::with_data(code, message, suggestions, details);
        if let Ok(json) = serde_json::to_string(&error) {
            println!("{}", json);
        }
        return;
    }

    eprintln!("Error: {}", message);
    for detail in &details {
        eprintln!("  - {}", detail);
    }
    if !suggestions.is_empty() {
        eprintln!("Did you mean: {}?", suggestions.join(", "));
    }
}
