//! comparison strategies used by conditions
//!
//! every comparer answers `compare(expected, actual)`. tag-only comparers are
//! stateless; scalar carries its operator, regex its compiled pattern and
//! custom a caller-supplied predicate.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::error::{ConfigError, EvalError};
use super::value::Value;

/// relational operators supported by the scalar comparer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarOp {
    /// equality: =, ==, eq
    Eq,
    /// inequality: !=, <>, ne
    Ne,
    /// greater than: >, gt
    Gt,
    /// greater than or equal: >=, gte
    Gte,
    /// less than: <, lt
    Lt,
    /// less than or equal: <=, lte
    Lte,
}

impl ScalarOp {
    /// parse operator from string (supports all forms)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" | "==" | "eq" => Some(ScalarOp::Eq),
            "!=" | "<>" | "ne" => Some(ScalarOp::Ne),
            ">" | "gt" => Some(ScalarOp::Gt),
            ">=" | "gte" => Some(ScalarOp::Gte),
            "<" | "lt" => Some(ScalarOp::Lt),
            "<=" | "lte" => Some(ScalarOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarOp::Eq => "=",
            ScalarOp::Ne => "!=",
            ScalarOp::Gt => ">",
            ScalarOp::Gte => ">=",
            ScalarOp::Lt => "<",
            ScalarOp::Lte => "<=",
        }
    }

    /// whether `actual <op> expected` holds given `actual.cmp(expected)`
    fn holds(self, ord: Ordering) -> bool {
        match self {
            ScalarOp::Eq => ord == Ordering::Equal,
            ScalarOp::Ne => ord != Ordering::Equal,
            ScalarOp::Gt => ord == Ordering::Greater,
            ScalarOp::Gte => ord != Ordering::Less,
            ScalarOp::Lt => ord == Ordering::Less,
            ScalarOp::Lte => ord != Ordering::Greater,
        }
    }
}

impl fmt::Display for ScalarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// caller-supplied predicate over the actual value
pub type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// a custom predicate, optionally registered under a name
///
/// the engine cannot guarantee that a custom predicate is pure: one with side
/// effects observes short-circuit evaluation order.
#[derive(Clone)]
pub struct CustomPredicate {
    name: Option<String>,
    predicate: Arc<PredicateFn>,
}

impl CustomPredicate {
    pub fn new(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: None,
            predicate: Arc::new(predicate),
        }
    }

    pub fn named(
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Some(name.into()),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, actual: &Value) -> bool {
        (self.predicate)(actual)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// value comparison strategy assigned to a condition
#[derive(Debug, Clone)]
pub enum Comparer {
    /// `actual == expected`
    Equality,
    /// `expected` is a member (list) or substring (text) of `actual`
    Contain { negated: bool },
    /// `actual <op> expected`
    Scalar(ScalarOp),
    /// `actual` matches the pattern held in `expected`
    Regex(Regex),
    /// `expected` is ignored, the predicate decides
    Custom(CustomPredicate),
}

impl Comparer {
    /// compile a regex comparer; invalid patterns are rejected here
    pub fn regex(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(Comparer::Regex)
            .map_err(|e| ConfigError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn custom(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Comparer::Custom(CustomPredicate::new(predicate))
    }

    /// resolve the comparer implied by a `compare` keyword
    ///
    /// accepts a comparer tag (`equality`, `contain`, `regex`), a scalar
    /// operator, or `IN` / `NOT IN`. `None` means equality. `custom` is not
    /// resolvable from a keyword since it needs a function value.
    pub fn resolve(compare: Option<&str>, expected: &Value) -> Result<Self, ConfigError> {
        let Some(compare) = compare else {
            return Ok(Comparer::Equality);
        };

        let keyword = compare.trim().to_lowercase();
        match keyword.as_str() {
            "equality" => Ok(Comparer::Equality),
            "contain" | "in" => Ok(Comparer::Contain { negated: false }),
            "not in" | "not_in" => Ok(Comparer::Contain { negated: true }),
            "regex" => {
                let pattern = expected.as_str().ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "regex comparer expects a string pattern, got {}",
                        expected.type_name()
                    ))
                })?;
                Comparer::regex(pattern)
            }
            "custom" => Err(ConfigError::UnknownCustom(
                expected
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| expected.to_string()),
            )),
            _ => ScalarOp::parse(&keyword)
                .map(Comparer::Scalar)
                .ok_or_else(|| ConfigError::UnknownOperator(compare.to_string())),
        }
    }

    /// comparer type tag
    pub fn tag(&self) -> &'static str {
        match self {
            Comparer::Equality => "equality",
            Comparer::Contain { .. } => "contain",
            Comparer::Scalar(_) => "scalar",
            Comparer::Regex(_) => "regex",
            Comparer::Custom(_) => "custom",
        }
    }

    /// keyword that resolves back to this comparer
    pub fn keyword(&self) -> &'static str {
        match self {
            Comparer::Equality => "equality",
            Comparer::Contain { negated: false } => "IN",
            Comparer::Contain { negated: true } => "NOT IN",
            Comparer::Scalar(op) => op.as_str(),
            Comparer::Regex(_) => "regex",
            Comparer::Custom(_) => "custom",
        }
    }

    pub fn compare(&self, expected: &Value, actual: &Value) -> Result<bool, EvalError> {
        match self {
            Comparer::Equality => Ok(actual.loosely_equals(expected)),
            Comparer::Contain { negated } => {
                contains(expected, actual).map(|hit| hit.map_or(false, |hit| hit != *negated))
            }
            Comparer::Scalar(op) => {
                if actual.is_absent() || expected.is_absent() {
                    return Ok(false);
                }
                actual
                    .ordering(expected)
                    .map(|ord| op.holds(ord))
                    .ok_or_else(|| self.mismatch(actual))
            }
            Comparer::Regex(re) => match actual {
                Value::Absent => Ok(false),
                _ => actual
                    .as_text()
                    .map(|text| re.is_match(&text))
                    .ok_or_else(|| self.mismatch(actual)),
            },
            Comparer::Custom(predicate) => Ok(predicate.call(actual)),
        }
    }

    fn mismatch(&self, actual: &Value) -> EvalError {
        EvalError::TypeMismatch {
            comparer: self.tag(),
            actual: format!("{} ({})", actual, actual.type_name()),
        }
    }
}

/// membership test; `Ok(None)` when the actual value is absent
fn contains(expected: &Value, actual: &Value) -> Result<Option<bool>, EvalError> {
    let candidates = match expected {
        Value::List(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };

    match actual {
        Value::Absent => Ok(None),
        Value::List(items) => Ok(Some(
            candidates
                .iter()
                .any(|c| items.iter().any(|item| item.loosely_equals(c))),
        )),
        Value::String(text) => Ok(Some(candidates.iter().any(|c| {
            c.as_text()
                .map(|needle| text.contains(needle.as_ref()))
                .unwrap_or(false)
        }))),
        other => Err(EvalError::TypeMismatch {
            comparer: "contain",
            actual: format!("{} ({})", other, other.type_name()),
        }),
    }
}

impl fmt::Display for Comparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparer::Equality => write!(f, "=="),
            Comparer::Contain { negated: false } => write!(f, "in"),
            Comparer::Contain { negated: true } => write!(f, "not in"),
            Comparer::Scalar(op) => write!(f, "{}", op),
            Comparer::Regex(_) => write!(f, "=~"),
            Comparer::Custom(p) => match p.name() {
                Some(name) => write!(f, "custom({})", name),
                None => write!(f, "custom"),
            },
        }
    }
}
