//! The built-in expression language, backed by [`evalexpr`].
//!
//! Context variables are flattened into dotted identifiers before evaluation:
//! a payload `{"customer": {"name": "Ada"}}` is read as `payload.customer.name`.
//! Arrays become tuples and `null` becomes the empty value `()`. Objects nested
//! inside arrays are kept as their JSON text.
//!
//! External names are read with `ref("name")`. A dotted argument such as
//! `ref("defaults.action")` resolves `defaults` and walks into the result.
//!
//! ```text
//! if(payload.status == "CANCELLED", "CANCEL", ())
//! configuration.action + "_" + str::to_uppercase(methodSignature.name)
//! ref("statusActions." + payload.status)
//! ```

use evalexpr::{
    ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprError, Function,
    HashMapContext, Node, Value as EvalValue, build_operator_tree,
};
use herald_core::{EvaluationContext, Expression, ExpressionError, ExpressionParser, Resolver};
use serde_json::{Number, Value};
use std::sync::{Arc, OnceLock};

/// Name of the function that reads external references.
pub const REFERENCE_FUNCTION: &str = "ref";

/// Parser for the built-in expression language.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleExpressionParser;

impl ExpressionParser for SimpleExpressionParser {
    fn parse(&self, source: &str) -> Result<Arc<dyn Expression>, ExpressionError> {
        let node: Node = build_operator_tree(source).map_err(|error| ExpressionError::Parse {
            expression: source.to_string(),
            message: error.to_string(),
        })?;
        Ok(Arc::new(CompiledExpression {
            source: source.to_string(),
            node,
        }))
    }
}

#[derive(Debug)]
struct CompiledExpression {
    source: String,
    node: Node,
}

impl Expression for CompiledExpression {
    fn evaluate(&self, context: &EvaluationContext) -> Result<Value, ExpressionError> {
        let failure = Arc::new(OnceLock::new());
        let eval_context = build_context(context, &failure)?;
        let result = self.node.eval_with_context(&eval_context);

        // A failed reference surfaces as its own error, not evalexpr's wrapper.
        if let Some(error) = failure.get() {
            return Err(error.clone());
        }
        result.map(from_eval_value).map_err(into_expression_error)
    }

    fn source(&self) -> &str {
        &self.source
    }
}

// ============================================================================
// Context
// ============================================================================

fn build_context(
    context: &EvaluationContext,
    failure: &Arc<OnceLock<ExpressionError>>,
) -> Result<HashMapContext, ExpressionError> {
    let mut eval_context: HashMapContext = HashMapContext::new();
    for (name, value) in context.variables() {
        define(&mut eval_context, name.to_string(), value)?;
    }

    let resolver = Arc::clone(context.resolver());
    let failure = Arc::clone(failure);
    let reference = Function::new(move |argument: &EvalValue| -> Result<EvalValue, EvalexprError> {
        let path = argument.as_string()?;
        match resolve_path(resolver.as_ref(), &path) {
            Ok(value) => Ok(to_eval_value(&value)),
            Err(error) => {
                let message = error.to_string();
                let _ = failure.set(error);
                Err(EvalexprError::CustomMessage(message))
            }
        }
    });
    eval_context
        .set_function(REFERENCE_FUNCTION.to_string(), reference)
        .map_err(into_expression_error)?;
    Ok(eval_context)
}

/// Defines `value` under `name`, expanding objects into dotted names.
fn define(context: &mut HashMapContext, name: String, value: &Value) -> Result<(), ExpressionError> {
    if let Value::Object(fields) = value {
        for (field, nested) in fields {
            define(context, format!("{name}.{field}"), nested)?;
        }
        return Ok(());
    }
    context
        .set_value(name, to_eval_value(value))
        .map_err(into_expression_error)
}

fn resolve_path(resolver: &dyn Resolver, path: &str) -> Result<Value, ExpressionError> {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or_default();
    let mut value = resolver.resolve(head)?;
    for segment in segments {
        value = match value {
            Value::Object(mut fields) => fields.remove(segment).unwrap_or(Value::Null),
            Value::Array(mut items) => match segment.parse::<usize>() {
                Ok(index) if index < items.len() => items.swap_remove(index),
                _ => Value::Null,
            },
            _ => Value::Null,
        };
    }
    Ok(value)
}

// ============================================================================
// Value conversion
// ============================================================================

fn to_eval_value(value: &Value) -> EvalValue {
    match value {
        Value::Null => EvalValue::Empty,
        Value::Bool(flag) => EvalValue::Boolean(*flag),
        Value::Number(number) => number
            .as_i64()
            .map(EvalValue::Int)
            .or_else(|| number.as_f64().map(EvalValue::Float))
            .unwrap_or(EvalValue::Empty),
        Value::String(text) => EvalValue::String(text.clone()),
        Value::Array(items) => EvalValue::Tuple(items.iter().map(to_eval_value).collect()),
        Value::Object(_) => EvalValue::String(value.to_string()),
    }
}

fn from_eval_value(value: EvalValue) -> Value {
    match value {
        EvalValue::String(text) => Value::String(text),
        EvalValue::Int(number) => Value::from(number),
        EvalValue::Float(number) => Number::from_f64(number).map_or(Value::Null, Value::Number),
        EvalValue::Boolean(flag) => Value::Bool(flag),
        EvalValue::Tuple(items) => Value::Array(items.into_iter().map(from_eval_value).collect()),
        EvalValue::Empty => Value::Null,
    }
}

fn into_expression_error(error: EvalexprError) -> ExpressionError {
    match error {
        EvalexprError::VariableIdentifierNotFound(name) => ExpressionError::UnknownVariable(name),
        other => ExpressionError::Evaluation(other.to_string()),
    }
}

/// Name of a JSON value's kind, as reported in conversion errors.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text of a scalar; strings are taken without quotes.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
