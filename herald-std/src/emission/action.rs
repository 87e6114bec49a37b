//! Action resolution.

use crate::expression::{SimpleExpressionParser, kind, to_text};
use herald_core::{
    EvaluationContext, Expression, ExpressionError, ExpressionParser, JoinPoint, NoResolver,
    Resolver, SharedPayload, actions,
};
use moka::sync::Cache;
use serde_json::{Value, json};
use std::{fmt, sync::Arc};
use tracing::{trace, warn};

/// Computes the action label of an event.
///
/// A non-blank action expression is evaluated first. If it yields a
/// non-blank string, that is the action. Otherwise the static action is used
/// when non-blank, and [`actions::NONE`] when it is not.
///
/// Parsed expressions are memoized per resolver in a bounded cache keyed by
/// the expression text.
///
/// The expression sees five variables:
///
/// | name             | value                                          |
/// |------------------|------------------------------------------------|
/// | `payload`        | the unwrapped payload                          |
/// | `wrappedPayload` | the return value before unwrapping            |
/// | `emittingSource` | `{ "type": <type name of the emitting source> }` |
/// | `methodSignature`| the intercepted method's signature             |
/// | `configuration`  | the emission configuration                     |
///
/// Object fields are read as dotted names, e.g. `payload.status`.
#[derive(Clone)]
pub struct ActionResolver {
    parser: Arc<dyn ExpressionParser>,
    resolver: Arc<dyn Resolver>,
    cache: Cache<String, Arc<dyn Expression>>,
}

impl ActionResolver {
    /// Default number of cached expressions.
    pub const DEFAULT_CACHE_CAPACITY: u64 = 1024;

    /// A resolver using the built-in expression language and no external
    /// references.
    pub fn new() -> Self {
        Self {
            parser: Arc::new(SimpleExpressionParser),
            resolver: Arc::new(NoResolver),
            cache: Cache::new(Self::DEFAULT_CACHE_CAPACITY),
        }
    }

    /// Use a different expression language.
    pub fn with_parser(mut self, parser: Arc<dyn ExpressionParser>) -> Self {
        self.parser = parser;
        self.cache.invalidate_all();
        self
    }

    /// Resolve `ref("name")` references through `resolver`.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Bound the expression cache to `capacity` entries.
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache = Cache::new(capacity);
        self
    }

    /// Resolves the action for one unwrapped payload.
    ///
    /// # Errors
    ///
    /// Parse and evaluation failures are returned, never replaced by the
    /// static action.
    pub fn resolve_action(
        &self,
        payload: &SharedPayload,
        wrapped_payload: &SharedPayload,
        join_point: &JoinPoint<'_>,
    ) -> Result<String, ExpressionError> {
        let config = join_point.config();
        if has_text(&config.action_expression) {
            let expression = self.compile(&config.action_expression)?;
            let context = self.context(payload, wrapped_payload, join_point)?;
            let value = expression.evaluate(&context)?;
            trace!(expression = expression.source(), result = %value, "evaluated action expression");
            if let Some(action) = into_action(value)?.filter(|action| has_text(action)) {
                return Ok(action);
            }
        }

        if has_text(&config.action) {
            Ok(config.action.clone())
        } else {
            Ok(actions::NONE.to_string())
        }
    }

    /// Number of expressions currently cached.
    pub fn cached_expressions(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn compile(&self, source: &str) -> Result<Arc<dyn Expression>, ExpressionError> {
        self.cache
            .try_get_with(source.to_string(), || self.parser.parse(source))
            .map_err(|error| (*error).clone())
    }

    fn context(
        &self,
        payload: &SharedPayload,
        wrapped_payload: &SharedPayload,
        join_point: &JoinPoint<'_>,
    ) -> Result<EvaluationContext, ExpressionError> {
        Ok(EvaluationContext::new(Arc::clone(&self.resolver))
            .with_variable("payload", view("payload", payload.to_value())?)
            .with_variable("wrappedPayload", view("wrappedPayload", wrapped_payload.to_value())?)
            .with_variable("emittingSource", json!({ "type": join_point.source_type() }))
            .with_variable(
                "methodSignature",
                view("methodSignature", serde_json::to_value(join_point.signature()))?,
            )
            .with_variable(
                "configuration",
                view("configuration", serde_json::to_value(join_point.config()))?,
            ))
    }
}

impl Default for ActionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionResolver")
            .field("cached_expressions", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

fn view(variable: &'static str, value: Result<Value, serde_json::Error>) -> Result<Value, ExpressionError> {
    value.map_err(|error| {
        warn!(variable, %error, "cannot build expression variable");
        ExpressionError::Serialization {
            variable,
            message: error.to_string(),
        }
    })
}

/// Converts an expression result into an action. `None` means "no usable
/// string".
fn into_action(value: Value) -> Result<Option<String>, ExpressionError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Bool(_) | Value::Number(_) => Ok(Some(to_text(&value))),
        other => Err(ExpressionError::Conversion { found: kind(&other) }),
    }
}

fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}
