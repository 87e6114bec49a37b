//! The emission interceptor.

use super::BusinessEventsFactory;
use herald_core::{EmissionError, EventPublisher, JoinPoint, ReturnValue};
use std::{fmt, sync::Arc};
use tracing::debug;

/// Wraps emitting operations: runs the operation, turns its return value into
/// events and publishes them, one at a time and in order, before the
/// operation's result is handed back to the caller.
///
/// A failing operation publishes nothing. A failing listener aborts the
/// remaining publications and its error replaces the operation's result.
///
/// # Example
///
/// ```rust,ignore
/// let order = emitter.around(join_point, || repository.save(order))?;
/// ```
#[derive(Clone)]
pub struct BusinessEventEmitter {
    events: BusinessEventsFactory,
    publisher: Arc<dyn EventPublisher>,
    order: i32,
}

impl BusinessEventEmitter {
    /// The order used when none is configured: the emitter runs innermost.
    pub const DEFAULT_ORDER: i32 = i32::MAX;

    /// An emitter building events with `events` and handing them to
    /// `publisher`.
    pub fn new(events: BusinessEventsFactory, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            events,
            publisher,
            order: Self::DEFAULT_ORDER,
        }
    }

    /// Set the position among other interceptors. Lower runs outer.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// The position among other interceptors.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Runs `proceed` and emits its successful return value.
    ///
    /// # Errors
    ///
    /// - [`EmissionError::VoidReturn`] before `proceed` runs, if the
    ///   signature declares no return value
    /// - the operation's own error, unchanged
    /// - any failure building or publishing events
    pub fn around<T, E, F>(&self, join_point: JoinPoint<'_>, proceed: F) -> Result<T, E>
    where
        T: ReturnValue,
        E: From<EmissionError>,
        F: FnOnce() -> Result<T, E>,
    {
        let signature = join_point.signature();
        debug!(%signature, source = join_point.source_type(), "intercepting emitting operation");
        if !signature.returns_value() {
            return Err(EmissionError::VoidReturn {
                signature: signature.to_string(),
            }
            .into());
        }

        let value = proceed()?;
        let emitted = self.emit(&value, &join_point)?;
        debug!(%signature, emitted, "emitted business events");
        Ok(value)
    }

    /// Builds and publishes the events for `value`. Returns how many were
    /// published.
    pub fn emit<T: ReturnValue>(
        &self,
        value: &T,
        join_point: &JoinPoint<'_>,
    ) -> Result<usize, EmissionError> {
        let payload = value.to_payload();
        let events = self.events.create_events(payload.as_ref(), join_point)?;
        for event in &events {
            self.publisher
                .publish(event)
                .map_err(EmissionError::Publish)?;
        }
        Ok(events.len())
    }
}

impl fmt::Debug for BusinessEventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessEventEmitter")
            .field("events", &self.events)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Implemented by types whose methods are annotated with
/// `#[emit_business_event]`.
///
/// Returning `None` runs the operation without emitting.
pub trait EmitsBusinessEvents {
    /// The emitter wrapping this instance's emitting methods.
    fn business_event_emitter(&self) -> Option<&BusinessEventEmitter>;
}
