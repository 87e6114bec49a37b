//! The publish boundary.

use crate::{error::BoxError, event::BusinessEvent};
use std::sync::Arc;

/// Delivers events to interested listeners.
///
/// Publishing is synchronous: when `publish` returns, every matching listener
/// has already run. The first listener error is returned unchanged.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an EventPublisher",
    label = "missing `EventPublisher` implementation",
    note = "Use `ListenerRegistry` or implement `EventPublisher` to deliver business events."
)]
pub trait EventPublisher: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: &BusinessEvent) -> Result<(), BoxError>;
}

impl<P: EventPublisher + ?Sized> EventPublisher for Arc<P> {
    fn publish(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        (**self).publish(event)
    }
}

impl<P: EventPublisher + ?Sized> EventPublisher for &P {
    fn publish(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        (**self).publish(event)
    }
}
