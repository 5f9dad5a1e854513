//! explicit boot object for the condition engine
//!
//! built once at startup and passed to whatever assembles container rules.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::conditions::{
    Collection, CollectionBuilder, ConfigError, Factory, TranslateError, Translator, Value,
};

/// the factory and translator, wired together
#[derive(Debug, Clone)]
pub struct Engine {
    factory: Arc<Factory>,
    translator: Translator,
}

impl Engine {
    /// boot with every built-in condition type registered
    pub fn boot() -> Self {
        Self::with_factory(Factory::with_defaults())
    }

    /// boot with a caller-populated factory
    ///
    /// the factory is frozen from here on: the engine only hands out shared
    /// references to it.
    pub fn with_factory(factory: Factory) -> Self {
        let factory = Arc::new(factory);
        debug!(types = factory.tags().len(), "condition engine booted");
        Self {
            translator: Translator::new(Arc::clone(&factory)),
            factory,
        }
    }

    /// register a named custom predicate for use in specifications
    pub fn with_custom(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.translator = self.translator.with_custom(name, predicate);
        self
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn translate(&self, spec: &JsonValue) -> Result<Collection, TranslateError> {
        self.translator.translate(spec)
    }

    pub fn to_spec(&self, collection: &Collection) -> Result<JsonValue, ConfigError> {
        self.translator.to_spec(collection)
    }

    /// start a fluent collection
    pub fn collection(&self) -> CollectionBuilder<'_> {
        CollectionBuilder::new(&self.factory)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::boot()
    }
}
