//! The emission side: action resolution, event construction and the
//! interceptor that publishes events after an operation returns.
//!
//! - [`ActionResolver`] - Computes an event's action label
//! - [`BusinessEventFactory`] - Builds one event per payload
//! - [`BusinessEventsFactory`] - Unwraps a return value and builds its events
//! - [`BusinessEventEmitter`] - Runs an operation and publishes its events

mod action;
mod aspect;
mod factory;

pub use action::ActionResolver;
pub use aspect::{BusinessEventEmitter, EmitsBusinessEvents};
pub use factory::{BusinessEventFactory, BusinessEventsFactory, DefaultEventFactory};
