//! atomic conditions over a single context fact

use std::fmt;

use super::comparer::{Comparer, ScalarOp};
use super::context::Context;
use super::error::{ConfigError, EvalError};
use super::value::Value;

/// the closed set of condition variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    EntityId,
    EntityParentId,
    EntityFormat,
    /// depth of the entity in its hierarchy, 1 = top level
    EntityLevel,
    EntityTemplate,
    /// the entity carries a term; reads the entity's term list
    EntityTerm,
    Term,
    Taxonomy,
    TermLevel,
}

/// shape of the expected value a variant accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Number,
    Text,
    TermRef,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 9] = [
        ConditionKind::EntityId,
        ConditionKind::EntityParentId,
        ConditionKind::EntityFormat,
        ConditionKind::EntityLevel,
        ConditionKind::EntityTemplate,
        ConditionKind::EntityTerm,
        ConditionKind::Term,
        ConditionKind::Taxonomy,
        ConditionKind::TermLevel,
    ];

    /// canonical type tag
    pub fn tag(self) -> &'static str {
        match self {
            ConditionKind::EntityId => "entity-id",
            ConditionKind::EntityParentId => "entity-parent-id",
            ConditionKind::EntityFormat => "entity-format",
            ConditionKind::EntityLevel => "entity-level",
            ConditionKind::EntityTemplate => "entity-template",
            ConditionKind::EntityTerm => "entity-term",
            ConditionKind::Term => "term",
            ConditionKind::Taxonomy => "taxonomy",
            ConditionKind::TermLevel => "term-level",
        }
    }

    /// name of the context fact this variant reads
    pub fn fact(self) -> &'static str {
        match self {
            ConditionKind::EntityTerm => "entity-terms",
            other => other.tag(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConditionKind::EntityId => "id of the entity being edited",
            ConditionKind::EntityParentId => "id of the entity's parent",
            ConditionKind::EntityFormat => "format of the entity (empty for standard)",
            ConditionKind::EntityLevel => "depth of the entity, 1 for top level",
            ConditionKind::EntityTemplate => "template assigned to the entity",
            ConditionKind::EntityTerm => "entity has a term (taxonomy:slug)",
            ConditionKind::Term => "term being edited (taxonomy:slug)",
            ConditionKind::Taxonomy => "taxonomy of the term being edited",
            ConditionKind::TermLevel => "depth of the term, 1 for top level",
        }
    }

    /// construct a fresh, unconfigured condition of this kind
    pub fn construct(self) -> Condition {
        Condition {
            kind: self,
            comparer: Comparer::Equality,
            value: Value::Absent,
        }
    }

    fn shape(self) -> Shape {
        match self {
            ConditionKind::EntityId
            | ConditionKind::EntityParentId
            | ConditionKind::EntityLevel
            | ConditionKind::TermLevel => Shape::Number,
            ConditionKind::EntityFormat
            | ConditionKind::EntityTemplate
            | ConditionKind::Taxonomy => Shape::Text,
            ConditionKind::EntityTerm | ConditionKind::Term => Shape::TermRef,
        }
    }

    /// check the expected value against the variant's shape
    fn validate(self, value: &Value) -> Result<(), ConfigError> {
        let shape = self.shape();
        let accepts = |v: &Value| match (shape, v) {
            (_, Value::Absent) => true,
            (Shape::Number, v) => v.as_f64().is_some(),
            (Shape::Text, Value::String(_)) => true,
            (Shape::TermRef, Value::String(s)) => is_term_ref(s),
            (Shape::TermRef, Value::Number(_)) => true,
            _ => false,
        };

        let ok = match value {
            Value::List(items) => items.iter().all(accepts),
            single => accepts(single),
        };

        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue(format!(
                "{} expects {}, got {}",
                self.tag(),
                match shape {
                    Shape::Number => "a number",
                    Shape::Text => "a string",
                    Shape::TermRef => "a term reference (taxonomy:slug or { taxonomy, term })",
                },
                value
            )))
        }
    }
}

fn is_term_ref(s: &str) -> bool {
    matches!(s.split_once(':'), Some((taxonomy, term)) if !taxonomy.is_empty() && !term.is_empty())
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// an atomic predicate: one fact, one comparer, one expected value
#[derive(Debug, Clone)]
pub struct Condition {
    kind: ConditionKind,
    comparer: Comparer,
    value: Value,
}

impl Condition {
    /// build a configured condition directly, bypassing the factory
    pub fn new(kind: ConditionKind, comparer: Comparer, value: Value) -> Result<Self, ConfigError> {
        kind.construct().configure(comparer, value)
    }

    /// assign comparer and expected value
    ///
    /// regex and custom comparers carry their own operand, so the value shape
    /// is only checked for the other comparers.
    pub fn configure(mut self, comparer: Comparer, value: Value) -> Result<Self, ConfigError> {
        if !matches!(comparer, Comparer::Regex(_) | Comparer::Custom(_)) {
            self.kind.validate(&value)?;
        }
        self.comparer = comparer;
        self.value = value;
        Ok(self)
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn comparer(&self) -> &Comparer {
        &self.comparer
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// read this condition's fact from the context and compare it
    pub fn is_fulfilled(&self, ctx: &Context) -> Result<bool, EvalError> {
        let actual = ctx.get(self.kind.fact());

        if self.kind == ConditionKind::EntityTerm {
            if let Some(has_term) = self.membership(actual) {
                return Ok(has_term);
            }
        }

        self.comparer.compare(&self.value, actual)
    }

    /// "entity has this term" semantics for equality on a term list
    ///
    /// returns `None` when the generic comparer applies instead, which
    /// includes a missing term list.
    fn membership(&self, actual: &Value) -> Option<bool> {
        let negated = match &self.comparer {
            Comparer::Equality | Comparer::Scalar(ScalarOp::Eq) => false,
            Comparer::Scalar(ScalarOp::Ne) => true,
            _ => return None,
        };

        let has_term = match actual {
            Value::Absent => return None,
            Value::List(terms) => terms.iter().any(|t| t.loosely_equals(&self.value)),
            single => single.loosely_equals(&self.value),
        };

        Some(has_term != negated)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comparer {
            Comparer::Custom(_) => write!(f, "{} {}", self.kind, self.comparer),
            _ => write!(f, "{} {} {}", self.kind, self.comparer, self.value),
        }
    }
}
