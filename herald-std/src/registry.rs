//! Listener registry.
//!
//! A builder collects listeners once during setup and freezes them into an
//! immutable [`ListenerRegistry`], which is also the standard in-process
//! [`EventPublisher`].

use herald_core::{BoxError, BusinessEvent, BusinessEventListener, EventPublisher};
use std::{fmt, sync::Arc};
use tracing::trace;

/// How a listener takes part in delivery.
///
/// Listeners are ordered by ascending `priority`, so a cache invalidator
/// registered at `-10` sees an order update before an auditor at `0`. The
/// `name` only shows up in delivery traces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerRegistration {
    /// Delivery rank; lower goes first.
    pub priority: i32,
    /// Label for traces.
    pub name: Option<String>,
}

impl ListenerRegistration {
    /// Priority `0`, unnamed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver at `priority`.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Label the listener in traces.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// A registered listener.
pub struct ListenerEntry {
    listener: Arc<dyn BusinessEventListener>,
    registration: ListenerRegistration,
}

impl ListenerEntry {
    /// The listener.
    pub fn listener(&self) -> &dyn BusinessEventListener {
        &*self.listener
    }

    /// How it was registered.
    pub fn registration(&self) -> &ListenerRegistration {
        &self.registration
    }
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("registration", &self.registration)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ListenerRegistryBuilder
// ============================================================================

/// Builder for a [`ListenerRegistry`].
///
/// # Example
/// ```ignore
/// let registry = ListenerRegistryBuilder::new()
///     .register(audit_listener)
///     .register_with_priority(cache_invalidator, -10)
///     .build();
/// ```
#[derive(Default)]
pub struct ListenerRegistryBuilder {
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener at priority `0`.
    pub fn register<L: BusinessEventListener>(mut self, listener: L) -> Self {
        self.register_mut(listener);
        self
    }

    /// Register a listener at priority `0` (mutable version).
    pub fn register_mut<L: BusinessEventListener>(&mut self, listener: L) {
        self.register_shared_mut(Arc::new(listener), ListenerRegistration::new());
    }

    /// Register a listener as described by `registration`.
    pub fn register_as<L: BusinessEventListener>(
        mut self,
        listener: L,
        registration: ListenerRegistration,
    ) -> Self {
        self.register_shared_mut(Arc::new(listener), registration);
        self
    }

    /// Register a listener at `priority`.
    pub fn register_with_priority<L: BusinessEventListener>(self, listener: L, priority: i32) -> Self {
        self.register_as(listener, ListenerRegistration::new().priority(priority))
    }

    /// Register an already shared listener (mutable version).
    pub fn register_shared_mut(
        &mut self,
        listener: Arc<dyn BusinessEventListener>,
        registration: ListenerRegistration,
    ) {
        self.entries.push(ListenerEntry {
            listener,
            registration,
        });
    }

    /// Freeze into a registry. Listeners with equal priority keep their
    /// registration order.
    pub fn build(mut self) -> ListenerRegistry {
        self.entries.sort_by_key(|entry| entry.registration.priority);
        ListenerRegistry {
            entries: self.entries,
        }
    }

    /// Get the number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the builder has no listeners.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// ListenerRegistry
// ============================================================================

/// An immutable, thread-safe set of listeners.
///
/// Publishing delivers an event to every listener in priority order,
/// on the calling thread. The first listener error stops delivery and is
/// returned unchanged.
#[derive(Debug)]
pub struct ListenerRegistry {
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    /// Create a builder.
    pub fn builder() -> ListenerRegistryBuilder {
        ListenerRegistryBuilder::new()
    }

    /// Listeners in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn BusinessEventListener> {
        self.entries.iter().map(ListenerEntry::listener)
    }

    /// Get the number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in delivery order.
    pub fn entries(&self) -> &[ListenerEntry] {
        &self.entries
    }
}

impl EventPublisher for ListenerRegistry {
    fn publish(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        for entry in &self.entries {
            trace!(
                id = %event.id(),
                listener = entry.registration.label(),
                "delivering business event"
            );
            entry.listener.on_event(event)?;
        }
        Ok(())
    }
}
