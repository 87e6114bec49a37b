//! Expression evaluation seam.
//!
//! Action expressions are parsed once by an [`ExpressionParser`] and evaluated
//! many times against an [`EvaluationContext`]. Values are `serde_json`
//! values; external names are looked up through a [`Resolver`].

use crate::error::ExpressionError;
use serde_json::{Map, Value};
use std::{collections::HashMap, fmt, sync::Arc};

/// A parsed expression.
pub trait Expression: Send + Sync + fmt::Debug {
    /// Evaluates the expression.
    fn evaluate(&self, context: &EvaluationContext) -> Result<Value, ExpressionError>;

    /// The text the expression was parsed from.
    fn source(&self) -> &str;
}

/// Parses expression text.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an ExpressionParser",
    label = "missing `ExpressionParser` implementation",
    note = "Implement `ExpressionParser` to plug in an expression language."
)]
pub trait ExpressionParser: Send + Sync {
    /// Parses `source` into a reusable expression.
    fn parse(&self, source: &str) -> Result<Arc<dyn Expression>, ExpressionError>;
}

/// Looks up external named values referenced by expressions.
pub trait Resolver: Send + Sync {
    /// Resolves `name`.
    fn resolve(&self, name: &str) -> Result<Value, ExpressionError>;
}

/// A resolver that knows no names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&self, name: &str) -> Result<Value, ExpressionError> {
        Err(ExpressionError::UnresolvedReference(name.to_string()))
    }
}

/// A resolver backed by a fixed set of named values.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, Value>,
}

impl MapResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a named value (mutable version).
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, name: &str) -> Result<Value, ExpressionError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| ExpressionError::UnresolvedReference(name.to_string()))
    }
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve(&self, name: &str) -> Result<Value, ExpressionError> {
        (**self).resolve(name)
    }
}

/// Named variables plus a resolver for external references.
#[derive(Clone)]
pub struct EvaluationContext {
    variables: Map<String, Value>,
    resolver: Arc<dyn Resolver>,
}

impl EvaluationContext {
    /// An empty context resolving references through `resolver`.
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            variables: Map::new(),
            resolver,
        }
    }

    /// Defines a variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set_variable(name, value);
        self
    }

    /// Defines a variable (mutable version).
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Looks up a variable.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// All defined variables, in name order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The resolver behind [`resolve`](Self::resolve).
    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    /// Resolves an external reference.
    pub fn resolve(&self, name: &str) -> Result<Value, ExpressionError> {
        self.resolver.resolve(name)
    }
}

impl fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}
