//! # herald-core
//!
//! Core types and traits for the Herald business event framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! extensions that contribute unwrappers, expression languages or publishers
//! without pulling in the standard implementations of `herald-std`.
//!
//! # Data Model
//!
//! - [`BusinessEvent`] - An immutable fact about a domain action: payload,
//!   action label, id, timestamp and metadata
//! - [`Payload`] - A value carried by an event, inspected at runtime through
//!   its [`TypeDescriptor`]
//! - [`MethodSignature`], [`EmitConfig`] and [`JoinPoint`] - What the
//!   surrounding runtime reports about an intercepted call
//!
//! # Seams
//!
//! - [`PayloadUnwrapper`] - Expands a return value into payloads
//! - [`ExpressionParser`], [`Expression`] and [`Resolver`] - The action
//!   expression language
//! - [`EventPublisher`] - The publish boundary
//! - [`BusinessEventListener`] and [`ListenerArgument`] - The listener side
//!
//! # Error Types
//!
//! - [`HeraldError`] - Top-level error type
//! - [`EmissionError`] - Emission failures
//! - [`ListenerError`] - Listener registration failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod descriptor;
mod error;
mod event;
mod expression;
mod listener;
mod payload;
mod publisher;
mod signature;
mod unwrap;

// Re-exports
pub use descriptor::{Describe, Supertype, TypeDescriptor, View};
pub use error::{
    BoxError, DispatchError, EmissionError, EventError, ExpressionError, HeraldError,
    ListenerError, SettingsError, UnboundParameter,
};
pub use event::{BusinessEvent, BusinessEventBuilder, actions};
pub use expression::{EvaluationContext, Expression, ExpressionParser, MapResolver, NoResolver, Resolver};
pub use listener::{Argument, BusinessEventListener, ListenerArgument, ListenerOutcome, Role};
pub use payload::{Nullable, Payload, ReturnValue, SharedPayload};
pub use publisher::EventPublisher;
pub use signature::{EmitConfig, JoinPoint, MethodSignature};
pub use unwrap::{NoopUnwrapper, PayloadUnwrapper, Payloads};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
