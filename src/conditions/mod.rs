//! condition fulfillment engine for container rules
//!
//! decides whether a container is active for the entity being edited:
//! - atomic conditions over one context fact (entity id, template, terms, ...)
//! - comparers: equality, contain, scalar (=, !=, >, >=, <, <=), regex, custom
//! - AND / OR collections nested to any depth
//! - trees built from a JSON specification or the fluent builder
//!
//! trees are immutable once built and can be evaluated concurrently.

mod collection;
mod comparer;
mod condition;
mod context;
mod error;
mod factory;
mod translator;
mod value;

pub use collection::{Collection, CollectionBuilder, Fulfillable, Relation};
pub use comparer::{Comparer, CustomPredicate, PredicateFn, ScalarOp};
pub use condition::{Condition, ConditionKind};
pub use context::Context;
pub use error::{ConfigError, EvalError, TranslateError};
pub use factory::Factory;
pub use translator::Translator;
pub use value::Value;
