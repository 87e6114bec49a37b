//! Error types for Herald.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HeraldError`] - Top-level error type for all Herald operations
//! - [`EventError`] - Errors building a [`BusinessEvent`](crate::BusinessEvent)
//! - [`EmissionError`] - Errors while emitting events for an intercepted call
//! - [`ExpressionError`] - Errors parsing or evaluating action expressions
//! - [`ListenerError`] - Errors registering listener methods
//! - [`DispatchError`] - Errors supplying arguments to a listener method
//! - [`SettingsError`] - Errors loading settings

use crate::listener::Role;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Herald operations.
#[derive(Error, Debug)]
pub enum HeraldError {
    /// An event could not be built.
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// Emission failed.
    #[error("emission error: {0}")]
    Emission(#[from] EmissionError),

    /// An action expression failed.
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// A listener could not be registered.
    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),

    /// A listener could not be invoked.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Settings could not be loaded.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors building an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// No payload was supplied.
    #[error("business event requires a payload")]
    MissingPayload,
}

/// Errors while emitting events for an intercepted call.
#[derive(Error, Debug)]
pub enum EmissionError {
    /// The intercepted method declares no return value.
    #[error("`{signature}` is marked to emit business events but returns nothing")]
    VoidReturn {
        /// Display form of the offending signature.
        signature: String,
    },

    /// The action could not be resolved.
    #[error("failed to resolve action: {0}")]
    Expression(#[from] ExpressionError),

    /// An event could not be built.
    #[error(transparent)]
    Event(#[from] EventError),

    /// Publishing failed, typically because a listener returned an error.
    /// The listener's error is carried as-is.
    #[error(transparent)]
    Publish(BoxError),
}

impl EmissionError {
    /// The listener or publisher error, if publishing failed.
    pub fn into_publish_error(self) -> Result<BoxError, Self> {
        match self {
            Self::Publish(error) => Ok(error),
            other => Err(other),
        }
    }
}

/// Errors parsing or evaluating an action expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// The expression text is malformed.
    #[error("cannot parse `{expression}`: {message}")]
    Parse {
        /// The expression text.
        expression: String,
        /// What went wrong.
        message: String,
    },

    /// A variable is not defined in the evaluation context.
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    /// An external reference could not be resolved.
    #[error("cannot resolve reference `{0}`")]
    UnresolvedReference(String),

    /// Evaluation failed.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// A context variable has no JSON view.
    #[error("cannot serialize `{variable}`: {message}")]
    Serialization {
        /// The context variable being built.
        variable: &'static str,
        /// The serializer's message.
        message: String,
    },

    /// The result cannot be used as an action.
    #[error("expression result of type {found} cannot be used as an action")]
    Conversion {
        /// Kind of value that was produced.
        found: &'static str,
    },
}

/// A listener parameter that matches no role.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "argument at position {position} of type {type_name} cannot be bound to business event, payload nor action"
)]
pub struct UnboundParameter {
    /// Zero-based parameter position.
    pub position: usize,
    /// Declared parameter type.
    pub type_name: &'static str,
}

/// Errors registering a listener method.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// The method carries no listener marker.
    #[error("`{method}` is not a business event listener")]
    NotAListener {
        /// The method name.
        method: String,
    },

    /// One or more parameters cannot be bound.
    #[error("cannot bind listener `{method}`: {}", join(.parameters))]
    Unbindable {
        /// The method name.
        method: String,
        /// Every parameter without a role.
        parameters: Vec<UnboundParameter>,
    },
}

fn join(parameters: &[UnboundParameter]) -> String {
    parameters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors supplying arguments to a listener method.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The owning instance is not registered.
    #[error("listener owner `{owner}` is not available")]
    OwnerUnavailable {
        /// The owner name.
        owner: String,
    },

    /// The owning instance has an unexpected type.
    #[error("listener owner `{owner}` is not a `{expected}`")]
    OwnerType {
        /// The owner name.
        owner: String,
        /// The type the method is declared on.
        expected: &'static str,
    },

    /// No argument was supplied for a parameter.
    #[error("no argument supplied for parameter {0}")]
    MissingArgument(usize),

    /// The argument for a role cannot be converted to the parameter type.
    #[error("cannot supply the {role} as `{expected}`")]
    Argument {
        /// Role of the argument.
        role: Role,
        /// Declared parameter type.
        expected: &'static str,
    },
}

/// Errors loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A settings source could not be read or extracted.
    #[error("failed to load settings")]
    Load(#[source] BoxError),
}

// Convenience conversions
impl From<BoxError> for HeraldError {
    fn from(err: BoxError) -> Self {
        HeraldError::Custom(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbindable_lists_every_parameter() {
        let error = ListenerError::Unbindable {
            method: "OrderListener::on_order".to_string(),
            parameters: vec![
                UnboundParameter {
                    position: 0,
                    type_name: "u8",
                },
                UnboundParameter {
                    position: 2,
                    type_name: "Vec<u8>",
                },
            ],
        };
        let message = error.to_string();
        assert!(message.contains("OrderListener::on_order"));
        assert!(message.contains("position 0 of type u8"));
        assert!(message.contains("position 2 of type Vec<u8>"));
        assert!(message.contains("business event, payload nor action"));
    }

    #[test]
    fn test_publish_error_is_transparent() {
        let listener_error: BoxError = "listener exploded".into();
        let error = EmissionError::Publish(listener_error);
        assert_eq!(error.to_string(), "listener exploded");
        let original = error.into_publish_error().unwrap();
        assert_eq!(original.to_string(), "listener exploded");
    }

    #[test]
    fn test_herald_error_from_conversions() {
        let error: HeraldError = EventError::MissingPayload.into();
        assert!(matches!(error, HeraldError::Event(EventError::MissingPayload)));

        let error: HeraldError = ExpressionError::UnknownVariable("x".into()).into();
        assert_eq!(error.to_string(), "expression error: unknown variable `x`");
    }
}
