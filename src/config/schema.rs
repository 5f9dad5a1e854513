use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub containers: Vec<ContainerDef>,
    #[serde(default)]
    pub settings: Settings,
}

/// a container and the conditions under which it is shown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerDef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// condition specification; a container without conditions is always active
    #[serde(default = "always")]
    pub conditions: JsonValue,
}

fn always() -> JsonValue {
    JsonValue::Bool(true)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// treat a container whose evaluation errored as inactive
    #[serde(default = "default_fail_closed")]
    pub fail_closed: bool,
    /// extra type tags mapped onto built-in condition types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<TypeAlias>,
}

fn default_fail_closed() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fail_closed: true,
            aliases: Vec::new(),
        }
    }
}

/// `{ "tag": "post_id", "type": "entity-id" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeAlias {
    pub tag: String,
    #[serde(rename = "type")]
    pub target: String,
}
