//! boolean composition of conditions
//!
//! a tree is a [`Fulfillable`]: either a leaf [`Condition`] or a [`Collection`]
//! folding its children under AND / OR. empty AND is true, empty OR is false.

use std::fmt;
use std::mem;

use super::comparer::CustomPredicate;
use super::condition::Condition;
use super::context::Context;
use super::error::{ConfigError, EvalError};
use super::factory::Factory;
use super::value::Value;

/// boolean relation of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    And,
    Or,
}

impl Relation {
    /// parse a relation keyword (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Relation::And),
            "OR" => Some(Relation::Or),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::And => "AND",
            Relation::Or => "OR",
        }
    }

    /// result of folding zero children
    pub fn identity(self) -> bool {
        matches!(self, Relation::And)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// a node of a condition tree
#[derive(Debug, Clone)]
pub enum Fulfillable {
    Leaf(Condition),
    Node(Collection),
}

impl Fulfillable {
    pub fn is_fulfilled(&self, ctx: &Context) -> Result<bool, EvalError> {
        match self {
            Fulfillable::Leaf(condition) => condition.is_fulfilled(ctx),
            Fulfillable::Node(collection) => collection.is_fulfilled(ctx),
        }
    }
}

impl From<Condition> for Fulfillable {
    fn from(condition: Condition) -> Self {
        Fulfillable::Leaf(condition)
    }
}

impl From<Collection> for Fulfillable {
    fn from(collection: Collection) -> Self {
        Fulfillable::Node(collection)
    }
}

impl fmt::Display for Fulfillable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fulfillable::Leaf(c) => write!(f, "{}", c),
            Fulfillable::Node(c) => write!(f, "{}", c),
        }
    }
}

/// ordered children folded under one relation
#[derive(Debug, Clone)]
pub struct Collection {
    relation: Relation,
    children: Vec<Fulfillable>,
}

impl Collection {
    pub fn new(relation: Relation) -> Self {
        Self {
            relation,
            children: Vec::new(),
        }
    }

    /// create an AND collection
    pub fn all(children: Vec<Fulfillable>) -> Self {
        Self {
            relation: Relation::And,
            children,
        }
    }

    /// create an OR collection
    pub fn any(children: Vec<Fulfillable>) -> Self {
        Self {
            relation: Relation::Or,
            children,
        }
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn children(&self) -> &[Fulfillable] {
        &self.children
    }

    /// append a child; order only affects short-circuit timing
    pub fn add(&mut self, child: impl Into<Fulfillable>) {
        self.children.push(child.into());
    }

    pub fn with(mut self, child: impl Into<Fulfillable>) -> Self {
        self.add(child);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// fold children left to right with short circuit
    ///
    /// AND stops at the first unfulfilled child, OR at the first fulfilled
    /// one. an evaluation error aborts the whole fold.
    pub fn is_fulfilled(&self, ctx: &Context) -> Result<bool, EvalError> {
        let identity = self.relation.identity();
        for child in &self.children {
            if child.is_fulfilled(ctx)? != identity {
                return Ok(!identity);
            }
        }
        Ok(identity)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.relation {
            Relation::And => "all",
            Relation::Or => "any",
        };
        write!(f, "{}(", name)?;
        for (i, c) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

/// fluent construction of a collection without a declarative spec
///
/// `and_where` / `or_where` fold left: `a.and(b).or(c)` is `(a AND b) OR c`.
/// the first error is kept and returned by [`CollectionBuilder::build`].
///
/// ```
/// use ccond::conditions::Context;
/// use ccond::Engine;
///
/// let engine = Engine::boot();
/// // (entity-id = 1 AND entity-level > 2) OR entity-template == "page.tpl"
/// let tree = engine
///     .collection()
///     .where_("entity-id", "=", 1)
///     .and_where("entity-level", ">", 2)
///     .or_where("entity-template", "equality", "page.tpl")
///     .build()
///     .unwrap();
///
/// let ctx = Context::new().with("entity-template", "page.tpl");
/// assert!(tree.is_fulfilled(&ctx).unwrap());
/// assert!(!tree.is_fulfilled(&Context::new().with("entity-id", 1)).unwrap());
/// ```
pub struct CollectionBuilder<'f> {
    factory: &'f Factory,
    root: Collection,
    error: Option<ConfigError>,
}

impl<'f> CollectionBuilder<'f> {
    pub fn new(factory: &'f Factory) -> Self {
        Self {
            factory,
            root: Collection::new(Relation::And),
            error: None,
        }
    }

    /// same as [`CollectionBuilder::and_where`]
    pub fn where_(self, tag: &str, compare: &str, value: impl Into<Value>) -> Self {
        self.and_where(tag, compare, value)
    }

    pub fn and_where(self, tag: &str, compare: &str, value: impl Into<Value>) -> Self {
        self.leaf(Relation::And, tag, compare, value.into())
    }

    pub fn or_where(self, tag: &str, compare: &str, value: impl Into<Value>) -> Self {
        self.leaf(Relation::Or, tag, compare, value.into())
    }

    /// AND a condition decided by a caller-supplied predicate
    pub fn and_where_custom(
        self,
        tag: &str,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        let made = self
            .factory
            .custom_condition(tag, CustomPredicate::new(predicate));
        self.push(Relation::And, made)
    }

    /// OR a condition decided by a caller-supplied predicate
    pub fn or_where_custom(
        self,
        tag: &str,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        let made = self
            .factory
            .custom_condition(tag, CustomPredicate::new(predicate));
        self.push(Relation::Or, made)
    }

    /// AND a nested group built by `f`
    pub fn and_group(self, f: impl FnOnce(CollectionBuilder<'f>) -> CollectionBuilder<'f>) -> Self {
        let group = f(CollectionBuilder::new(self.factory)).build();
        self.push(Relation::And, group)
    }

    /// OR a nested group built by `f`
    pub fn or_group(self, f: impl FnOnce(CollectionBuilder<'f>) -> CollectionBuilder<'f>) -> Self {
        let group = f(CollectionBuilder::new(self.factory)).build();
        self.push(Relation::Or, group)
    }

    pub fn build(self) -> Result<Collection, ConfigError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.root),
        }
    }

    fn leaf(self, relation: Relation, tag: &str, compare: &str, value: Value) -> Self {
        let made = self.factory.condition(tag, Some(compare), value);
        self.push(relation, made)
    }

    fn push<T: Into<Fulfillable>>(mut self, relation: Relation, made: Result<T, ConfigError>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let child = match made {
            Ok(child) => child.into(),
            Err(e) => {
                self.error = Some(e);
                return self;
            }
        };

        if self.root.len() <= 1 {
            self.root.relation = relation;
        } else if self.root.relation != relation {
            let previous = mem::replace(&mut self.root, Collection::new(relation));
            self.root.add(previous);
        }
        self.root.add(child);
        self
    }
}
