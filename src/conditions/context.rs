//! evaluation context: read-only facts about the entity being edited

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::debug;

use super::error::ConfigError;
use super::value::Value;

static ABSENT: Value = Value::Absent;

/// facts describing the current evaluation subject
///
/// assembled by the caller per request; conditions only read from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    facts: HashMap<String, Value>,
}

impl Context {
    /// create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// set a fact
    pub fn with(mut self, fact: impl Into<String>, value: impl Into<Value>) -> Self {
        self.facts.insert(fact.into(), value.into());
        self
    }

    /// read a fact, `Value::Absent` when missing
    pub fn get(&self, fact: &str) -> &Value {
        self.facts.get(fact).unwrap_or(&ABSENT)
    }

    pub fn contains(&self, fact: &str) -> bool {
        self.facts.contains_key(fact)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// build a context from a JSON object of facts
    ///
    /// facts with no value representation (arbitrary objects) are skipped,
    /// so they read as absent.
    pub fn from_json(json: &JsonValue) -> Result<Self, ConfigError> {
        let obj = json
            .as_object()
            .ok_or_else(|| ConfigError::Malformed("context must be an object".into()))?;

        let mut facts = HashMap::with_capacity(obj.len());
        for (fact, value) in obj {
            match Value::from_json(value) {
                Ok(value) => {
                    facts.insert(fact.clone(), value);
                }
                Err(e) => debug!(fact = %fact, error = %e, "skipping context fact"),
            }
        }

        Ok(Self { facts })
    }
}
