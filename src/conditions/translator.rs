//! translator - converts declarative JSON specifications to condition trees
//!
//! supports:
//! - relation nodes: `{ "relation": "AND" | "OR", "items": [...] }`
//! - leaf nodes: `{ "type": tag, "compare": keyword, "value": any }`
//! - bare `true` / `false` (always / never)
//! - named custom predicates: `{ "compare": "custom", "value": name }`
//!
//! the reverse direction, [`Translator::to_spec`], lowers a tree back to a
//! specification that translates to an equivalent tree.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use super::collection::{Collection, Fulfillable, Relation};
use super::comparer::{Comparer, CustomPredicate};
use super::condition::Condition;
use super::error::{ConfigError, TranslateError};
use super::factory::Factory;
use super::value::Value;

/// builds condition trees from specifications using a shared factory
#[derive(Debug, Clone)]
pub struct Translator {
    factory: Arc<Factory>,
    customs: HashMap<String, CustomPredicate>,
}

impl Translator {
    pub fn new(factory: Arc<Factory>) -> Self {
        Self {
            factory,
            customs: HashMap::new(),
        }
    }

    /// make a predicate available to specs as `{ "compare": "custom", "value": name }`
    pub fn with_custom(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        self.customs
            .insert(name.clone(), CustomPredicate::named(name, predicate));
        self
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// translate a specification into a root collection
    ///
    /// a leaf at the root is wrapped in a single-child AND collection.
    pub fn translate(&self, spec: &JsonValue) -> Result<Collection, TranslateError> {
        let root = match self.translate_node(spec, "")? {
            Fulfillable::Node(collection) => collection,
            leaf @ Fulfillable::Leaf(_) => Collection::all(vec![leaf]),
        };
        debug!(tree = %root, "translated condition spec");
        Ok(root)
    }

    fn translate_node(&self, spec: &JsonValue, path: &str) -> Result<Fulfillable, TranslateError> {
        match spec {
            JsonValue::Object(obj) if obj.contains_key("relation") => {
                self.translate_relation(obj, path)
            }
            JsonValue::Object(obj) if obj.contains_key("type") => self.translate_leaf(obj, path),
            JsonValue::Object(_) => Err(TranslateError::new(
                ConfigError::Malformed("expected a 'relation' or a 'type' key".into()),
                path,
            )),
            // bare boolean: true = always, false = never
            JsonValue::Bool(true) => Ok(Collection::new(Relation::And).into()),
            JsonValue::Bool(false) => Ok(Collection::new(Relation::Or).into()),
            other => Err(TranslateError::new(
                ConfigError::Malformed(format!("expected object, got {}", other)),
                path,
            )),
        }
    }

    fn translate_relation(
        &self,
        obj: &Map<String, JsonValue>,
        path: &str,
    ) -> Result<Fulfillable, TranslateError> {
        let relation = obj
            .get("relation")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                TranslateError::new(
                    ConfigError::Malformed("'relation' must be a string".into()),
                    join(path, "relation"),
                )
            })?;
        let relation = Relation::parse(relation).ok_or_else(|| {
            TranslateError::new(
                ConfigError::UnknownRelation(relation.to_string()),
                join(path, "relation"),
            )
        })?;

        let items = match obj.get("items") {
            Some(JsonValue::Array(items)) => items,
            Some(_) => {
                return Err(TranslateError::new(
                    ConfigError::Malformed("'items' must be an array".into()),
                    join(path, "items"),
                ))
            }
            None => {
                return Err(TranslateError::new(
                    ConfigError::Malformed("relation node is missing 'items'".into()),
                    path,
                ))
            }
        };

        let children = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.translate_node(item, &join(path, &format!("items[{}]", i))))
            .collect::<Result<Vec<_>, _>>()?;

        let collection = match relation {
            Relation::And => Collection::all(children),
            Relation::Or => Collection::any(children),
        };
        Ok(collection.into())
    }

    fn translate_leaf(
        &self,
        obj: &Map<String, JsonValue>,
        path: &str,
    ) -> Result<Fulfillable, TranslateError> {
        let at = |kind: ConfigError| TranslateError::new(kind, path);

        let tag = obj
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| at(ConfigError::Malformed("'type' must be a string".into())))?;

        let compare = match obj.get("compare") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s.as_str()),
            Some(_) => {
                return Err(at(ConfigError::Malformed(
                    "'compare' must be a string".into(),
                )))
            }
        };

        let value = obj
            .get("value")
            .map(Value::from_json)
            .transpose()
            .map_err(at)?
            .unwrap_or(Value::Absent);

        let condition = match compare {
            Some(c) if c.trim().eq_ignore_ascii_case("custom") => {
                let predicate = value
                    .as_str()
                    .and_then(|name| self.customs.get(name))
                    .cloned()
                    .ok_or_else(|| at(ConfigError::UnknownCustom(value.to_string())))?;
                self.factory.custom_condition(tag, predicate)
            }
            _ => self.factory.condition(tag, compare, value),
        }
        .map_err(at)?;

        Ok(condition.into())
    }

    /// lower a tree back to a specification
    pub fn to_spec(&self, collection: &Collection) -> Result<JsonValue, ConfigError> {
        let items = collection
            .children()
            .iter()
            .map(|child| match child {
                Fulfillable::Leaf(condition) => leaf_spec(condition),
                Fulfillable::Node(nested) => self.to_spec(nested),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(json!({
            "relation": collection.relation().as_str(),
            "items": items,
        }))
    }
}

fn leaf_spec(condition: &Condition) -> Result<JsonValue, ConfigError> {
    let value = match condition.comparer() {
        Comparer::Custom(predicate) => match predicate.name() {
            Some(name) => JsonValue::String(name.to_string()),
            None => {
                return Err(ConfigError::NotSerializable(format!(
                    "anonymous custom comparer on '{}'",
                    condition.kind()
                )))
            }
        },
        _ => condition.value().to_json(),
    };

    Ok(json!({
        "type": condition.kind().tag(),
        "compare": condition.comparer().keyword(),
        "value": value,
    }))
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}
