//! Listener-side seams: parameter roles, argument extraction and the
//! listener trait itself.

use crate::{
    descriptor::{Describe, TypeDescriptor},
    error::{BoxError, DispatchError},
    event::BusinessEvent,
    payload::{Payload, SharedPayload},
};
use std::{
    any::{Any, type_name},
    fmt,
    sync::Arc,
};

/// The semantic meaning of a listener parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The event itself.
    Event,
    /// The event's payload.
    Payload,
    /// The event's action label.
    Action,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Event => "business event",
            Role::Payload => "payload",
            Role::Action => "action",
        })
    }
}

/// The value a bound role supplies for one event.
#[derive(Debug, Clone, Copy)]
pub enum Argument<'a> {
    /// The event itself.
    Event(&'a BusinessEvent),
    /// The event's payload.
    Payload(&'a SharedPayload),
    /// The event's action label.
    Action(&'a str),
}

impl<'a> Argument<'a> {
    /// The argument `role` supplies for `event`.
    pub fn for_role(role: Role, event: &'a BusinessEvent) -> Self {
        match role {
            Role::Event => Argument::Event(event),
            Role::Payload => Argument::Payload(event.shared_payload()),
            Role::Action => Argument::Action(event.action()),
        }
    }

    /// The role this argument was produced for.
    pub fn role(&self) -> Role {
        match self {
            Argument::Event(_) => Role::Event,
            Argument::Payload(_) => Role::Payload,
            Argument::Action(_) => Role::Action,
        }
    }

    fn mismatch<T>(&self) -> DispatchError {
        DispatchError::Argument {
            role: self.role(),
            expected: type_name::<T>(),
        }
    }
}

/// A type that can be declared as a listener parameter.
///
/// Implemented for [`BusinessEvent`], for every cloneable payload type and for
/// [`SharedPayload`] (which accepts any payload).
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a listener parameter",
    label = "missing `ListenerArgument` implementation",
    note = "Listener parameters must be `BusinessEvent`, `SharedPayload` or a cloneable `Payload` type."
)]
pub trait ListenerArgument: Sized + 'static {
    /// The declared parameter type.
    fn parameter_type() -> TypeDescriptor;

    /// Converts the value supplied by a bound role.
    fn from_argument(argument: Argument<'_>) -> Result<Self, DispatchError>;
}

impl ListenerArgument for BusinessEvent {
    fn parameter_type() -> TypeDescriptor {
        BusinessEvent::descriptor()
    }

    fn from_argument(argument: Argument<'_>) -> Result<Self, DispatchError> {
        match argument {
            Argument::Event(event) => Ok(event.clone()),
            other => Err(other.mismatch::<Self>()),
        }
    }
}

impl<T: Payload + Describe + Clone> ListenerArgument for T {
    fn parameter_type() -> TypeDescriptor {
        T::descriptor()
    }

    fn from_argument(argument: Argument<'_>) -> Result<Self, DispatchError> {
        match argument {
            Argument::Payload(payload) => payload
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| argument.mismatch::<T>()),
            Argument::Action(action) => (Box::new(action.to_owned()) as Box<dyn Any>)
                .downcast::<T>()
                .map(|action| *action)
                .map_err(|_| argument.mismatch::<T>()),
            Argument::Event(_) => Err(argument.mismatch::<T>()),
        }
    }
}

impl ListenerArgument for SharedPayload {
    fn parameter_type() -> TypeDescriptor {
        TypeDescriptor::any()
    }

    fn from_argument(argument: Argument<'_>) -> Result<Self, DispatchError> {
        match argument {
            Argument::Payload(payload) => Ok(Arc::clone(payload)),
            other => Err(other.mismatch::<Self>()),
        }
    }
}

/// What a listener method may return.
pub trait ListenerOutcome {
    /// Converts the return value into a dispatch result.
    fn into_result(self) -> Result<(), BoxError>;
}

impl ListenerOutcome for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> ListenerOutcome for Result<(), E> {
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Receives published business events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a BusinessEventListener",
    label = "missing `BusinessEventListener` implementation",
    note = "Implement `BusinessEventListener` or use a closure `Fn(&BusinessEvent) -> Result<(), BoxError>`."
)]
pub trait BusinessEventListener: Send + Sync + 'static {
    /// Handles one event. Errors propagate to the publisher unchanged.
    fn on_event(&self, event: &BusinessEvent) -> Result<(), BoxError>;
}

impl<F> BusinessEventListener for F
where
    F: Fn(&BusinessEvent) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn on_event(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        self(event)
    }
}
