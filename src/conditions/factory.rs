//! registry from condition type tag to condition constructor

use std::collections::HashMap;

use strsim::levenshtein;
use tracing::debug;

use super::comparer::{Comparer, CustomPredicate};
use super::condition::{Condition, ConditionKind};
use super::error::ConfigError;
use super::value::Value;

/// maximum edit distance for "did you mean" suggestions
const SUGGESTION_DISTANCE: usize = 2;

/// maps type tags to condition variants
///
/// populated once at boot; the engine shares it read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Factory {
    kinds: HashMap<String, ConditionKind>,
}

impl Factory {
    /// create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// registry with every built-in variant under its canonical tag
    pub fn with_defaults() -> Self {
        let kinds = ConditionKind::ALL
            .iter()
            .map(|kind| (kind.tag().to_string(), *kind))
            .collect();
        Self { kinds }
    }

    /// register a tag; re-registering the same variant is a no-op
    pub fn register(&mut self, tag: impl Into<String>, kind: ConditionKind) -> Result<(), ConfigError> {
        let tag = tag.into();

        match self.kinds.get(&tag) {
            Some(existing) if *existing == kind => Ok(()),
            Some(existing) => Err(ConfigError::DuplicateType {
                tag,
                existing: existing.tag().to_string(),
            }),
            None => {
                debug!(tag = %tag, kind = %kind, "registered condition type");
                self.kinds.insert(tag, kind);
                Ok(())
            }
        }
    }

    /// instantiate a fresh condition for a registered tag
    pub fn make(&self, tag: &str) -> Result<Condition, ConfigError> {
        self.kinds
            .get(tag)
            .map(|kind| kind.construct())
            .ok_or_else(|| ConfigError::UnknownType {
                tag: tag.to_string(),
                suggestions: self.suggest(tag),
            })
    }

    /// make a condition and assign the comparer implied by `compare`
    pub fn condition(
        &self,
        tag: &str,
        compare: Option<&str>,
        value: Value,
    ) -> Result<Condition, ConfigError> {
        let condition = self.make(tag)?;
        let comparer = Comparer::resolve(compare, &value)?;
        condition.configure(comparer, value)
    }

    /// make a condition decided by a custom predicate
    pub fn custom_condition(
        &self,
        tag: &str,
        predicate: CustomPredicate,
    ) -> Result<Condition, ConfigError> {
        let value = predicate
            .name()
            .map(Value::from)
            .unwrap_or(Value::Absent);
        self.make(tag)?.configure(Comparer::Custom(predicate), value)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    pub fn kind(&self, tag: &str) -> Option<ConditionKind> {
        self.kinds.get(tag).copied()
    }

    /// registered tags in sorted order
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    fn suggest(&self, tag: &str) -> Vec<String> {
        let query = tag.to_lowercase();
        let mut matches: Vec<(usize, &str)> = self
            .kinds
            .keys()
            .map(|known| (levenshtein(&query, known), known.as_str()))
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .collect();

        matches.sort();
        matches.into_iter().map(|(_, t)| t.to_string()).collect()
    }
}
