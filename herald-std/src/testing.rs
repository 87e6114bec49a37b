//! Testing utilities for Herald.
//!
//! [`BusinessEventRecorder`] records every event it receives, either as the
//! publisher handed to an emitter or as a listener in a registry, and offers
//! chainable assertions over what was recorded:
//!
//! ```rust,ignore
//! let recorder = BusinessEventRecorder::new();
//! let emitter = events.emitter(Arc::new(recorder.clone())).unwrap();
//!
//! service.place_order(order)?;
//!
//! recorder
//!     .assert_that()
//!     .with_payload_type::<Order>()
//!     .exactly_one_with_action(actions::CREATE)
//!     .and()
//!     .count(1);
//! ```

use herald_core::{BoxError, BusinessEvent, BusinessEventListener, Describe, EventPublisher};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

// ============================================================================
// Recorder
// ============================================================================

/// Records events and forwards them to registered callbacks.
///
/// Clones share the same recording.
#[derive(Clone, Default)]
pub struct BusinessEventRecorder {
    events: Arc<Mutex<Vec<BusinessEvent>>>,
    listeners: Arc<Mutex<Vec<Arc<dyn BusinessEventListener>>>>,
}

impl BusinessEventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` for every event after it was recorded. A listener
    /// error is returned to the publisher.
    pub fn on_recorded<L: BusinessEventListener>(&self, listener: L) -> &Self {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
        self
    }

    /// Get a copy of the recorded events.
    pub fn events(&self) -> Vec<BusinessEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Clear all recorded events.
    pub fn reset(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Assertions over a snapshot of the recorded events.
    pub fn assert_that(&self) -> EventAssertions {
        EventAssertions::new(self.events())
    }

    fn record(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        listeners
            .iter()
            .try_for_each(|listener| listener.on_event(event))
    }
}

impl EventPublisher for BusinessEventRecorder {
    fn publish(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        self.record(event)
    }
}

impl BusinessEventListener for BusinessEventRecorder {
    fn on_event(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        self.record(event)
    }
}

impl fmt::Debug for BusinessEventRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessEventRecorder")
            .field("events", &self.count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Chainable assertions over recorded events.
///
/// Filters narrow the selection; [`and`](Self::and) returns to all recorded
/// events. Every check panics with a description of the selection on
/// failure.
#[derive(Debug, Clone)]
pub struct EventAssertions {
    recorded: Arc<[BusinessEvent]>,
    selected: Vec<BusinessEvent>,
}

impl EventAssertions {
    /// Assertions over `events`.
    pub fn new(events: Vec<BusinessEvent>) -> Self {
        Self {
            recorded: events.clone().into(),
            selected: events,
        }
    }

    /// The selected events.
    pub fn events(&self) -> &[BusinessEvent] {
        &self.selected
    }

    /// Keep events whose payload is assignable to `T`.
    pub fn with_payload_type<T: Describe>(self) -> Self {
        self.matching(|event| event.payload().is::<T>())
    }

    /// Keep events with `action`.
    pub fn with_action(self, action: &str) -> Self {
        self.matching(|event| event.action() == action)
    }

    /// Keep events whose action is one of `actions`.
    pub fn with_one_of_actions(self, actions: &[&str]) -> Self {
        self.matching(|event| actions.iter().any(|action| *action == event.action()))
    }

    /// Keep events satisfying `predicate`.
    pub fn matching(mut self, predicate: impl Fn(&BusinessEvent) -> bool) -> Self {
        self.selected.retain(|event| predicate(event));
        self
    }

    /// Select all recorded events again.
    pub fn and(self) -> Self {
        Self {
            selected: self.recorded.to_vec(),
            recorded: self.recorded,
        }
    }

    /// Assert the number of selected events.
    #[track_caller]
    pub fn count(self, expected: usize) -> Self {
        assert_eq!(
            self.selected.len(),
            expected,
            "expected {expected} business event(s), found {:?}",
            self.summary()
        );
        self
    }

    /// Assert that no event is selected.
    #[track_caller]
    pub fn none_emitted(self) -> Self {
        self.count(0)
    }

    /// Assert that exactly one event is selected.
    #[track_caller]
    pub fn one_emitted(self) -> Self {
        self.count(1)
    }

    /// Assert `requirement` for every selected event.
    #[track_caller]
    pub fn all_satisfy(self, requirement: impl Fn(&BusinessEvent) -> bool) -> Self {
        for event in &self.selected {
            assert!(
                requirement(event),
                "business event {} ({}) does not satisfy the requirement",
                event.id(),
                event.action()
            );
        }
        self
    }

    /// The selected payloads as `T`.
    ///
    /// # Panics
    ///
    /// If a selected payload is not assignable to `T`.
    #[track_caller]
    pub fn payloads<T: Describe + Clone>(&self) -> Vec<T> {
        self.selected
            .iter()
            .map(|event| match event.payload_as::<T>() {
                Some(payload) => payload.clone(),
                None => panic!(
                    "payload of type {} is not a {}",
                    event.payload().type_name(),
                    std::any::type_name::<T>()
                ),
            })
            .collect()
    }

    /// Assert that the selected payloads are `expected`, in emission order.
    #[track_caller]
    pub fn emitted_with_payloads<T>(self, expected: &[T]) -> Self
    where
        T: Describe + Clone + PartialEq + fmt::Debug,
    {
        let this = self.count(expected.len());
        let actual = this.payloads::<T>();
        assert!(
            actual == expected,
            "expected payloads {expected:?} in this order, got {actual:?}"
        );
        this
    }

    /// Assert that exactly one event is selected and its payload equals
    /// `expected`.
    #[track_caller]
    pub fn exactly_one_with_payload<T>(self, expected: &T) -> Self
    where
        T: Describe + Clone + PartialEq + fmt::Debug,
    {
        self.one_emitted()
            .emitted_with_payloads(std::slice::from_ref(expected))
    }

    /// Assert that exactly one event is selected and its action is `action`.
    #[track_caller]
    pub fn exactly_one_with_action(self, action: &str) -> Self {
        self.one_emitted()
            .all_satisfy(|event| event.action() == action)
    }

    fn summary(&self) -> Vec<(String, &'static str)> {
        self.selected
            .iter()
            .map(|event| (event.action().to_string(), event.payload().type_name()))
            .collect()
    }
}
