//! dynamically typed values compared by conditions

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use serde_json::Value as JsonValue;

use super::error::ConfigError;

/// a value read from a context or expected by a condition
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// sentinel for a fact missing from the context (or an explicit null)
    #[default]
    Absent,
    /// boolean value
    Bool(bool),
    /// integer value
    Number(i64),
    /// floating point value
    Float(f64),
    /// string value
    String(String),
    /// list of values (term lists, `IN` operands)
    List(Vec<Value>),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// try to get as list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// numeric view: numbers, and strings that parse as finite numbers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// exact integer view: integers, and strings that parse as `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// text view used by regex matching
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Float(f) => Some(Cow::Owned(f.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Absent | Value::List(_) => None,
        }
    }

    /// equality used by the equality and contain comparers
    ///
    /// numeric views are compared numerically (exactly when both sides are
    /// integers), lists element-wise, everything else structurally. `Absent`
    /// only equals `Absent`.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            _ => match (self.as_i64(), other.as_i64()) {
                (Some(a), Some(b)) => a == b,
                _ => match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => self == other,
                },
            },
        }
    }

    /// ordering used by the scalar comparer, `None` when the values are not comparable
    pub fn ordering(&self, other: &Value) -> Option<Ordering> {
        if let (Value::Bool(a), Value::Bool(b)) = (self, other) {
            return Some(a.cmp(b));
        }
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return Some(a.cmp(&b));
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => match (self, other) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => None,
            },
        }
    }

    /// short name of the value's shape, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Bool(_) => "bool",
            Value::Number(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// convert from JSON
    ///
    /// `null` becomes `Absent`. the only object shape accepted is a term
    /// reference `{ "taxonomy": ..., "term": ... }`, normalized to `"taxonomy:term"`.
    pub fn from_json(json: &JsonValue) -> Result<Self, ConfigError> {
        match json {
            JsonValue::Null => Ok(Value::Absent),
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Number(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(ConfigError::InvalidValue(format!("invalid number {}", n)))
                }
            }
            JsonValue::String(s) => Ok(Value::String(s.clone())),
            JsonValue::Array(arr) => arr
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            JsonValue::Object(obj) => {
                let taxonomy = obj.get("taxonomy").and_then(JsonValue::as_str);
                let term = obj.get("term").map(|t| match t {
                    JsonValue::String(s) => Some(s.clone()),
                    JsonValue::Number(n) => Some(n.to_string()),
                    _ => None,
                });
                match (taxonomy, term) {
                    (Some(taxonomy), Some(Some(term))) if obj.len() == 2 => {
                        Ok(Value::String(format!("{}:{}", taxonomy, term)))
                    }
                    _ => Err(ConfigError::InvalidValue(
                        "objects are only supported as { taxonomy, term } references".into(),
                    )),
                }
            }
        }
    }

    /// convert to JSON (`Absent` becomes `null`)
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Absent => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => JsonValue::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::List(l) => JsonValue::Array(l.iter().map(Value::to_json).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "absent"),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}
