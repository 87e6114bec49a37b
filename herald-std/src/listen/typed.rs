//! Action-routed listeners for one payload type.

use herald_core::{BoxError, BusinessEvent, BusinessEventListener, Describe, ListenerOutcome, actions};
use std::{collections::HashMap, fmt, marker::PhantomData, sync::Arc};
use tracing::debug;

type Callback<T> = Arc<dyn Fn(&T, &BusinessEvent) -> Result<(), BoxError> + Send + Sync>;
type Fallback<T> = Arc<dyn Fn(&str, &T, &BusinessEvent) -> Result<(), BoxError> + Send + Sync>;

/// A listener for payloads of type `T` that routes each event to the
/// callback registered for its action.
///
/// Events whose payload is not assignable to `T` are ignored. Events with an
/// action no callback is registered for go to the
/// [`on_unhandled`](Self::on_unhandled) fallback, which does nothing by
/// default.
///
/// # Example
///
/// ```rust,ignore
/// let listener = TypedListener::<Order>::new()
///     .on_create(|order, _event| index.insert(order))
///     .on_delete(|order, _event| index.remove(order))
///     .on("ARCHIVE", |order, _event| archive.store(order));
/// ```
pub struct TypedListener<T> {
    callbacks: HashMap<String, Callback<T>>,
    fallback: Option<Fallback<T>>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Describe> TypedListener<T> {
    /// A listener with no callbacks.
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            fallback: None,
            _marker: PhantomData,
        }
    }

    /// Handle [`actions::CREATE`].
    pub fn on_create<F, R>(self, callback: F) -> Self
    where
        F: Fn(&T, &BusinessEvent) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        self.on(actions::CREATE, callback)
    }

    /// Handle [`actions::UPDATE`].
    pub fn on_update<F, R>(self, callback: F) -> Self
    where
        F: Fn(&T, &BusinessEvent) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        self.on(actions::UPDATE, callback)
    }

    /// Handle [`actions::DELETE`].
    pub fn on_delete<F, R>(self, callback: F) -> Self
    where
        F: Fn(&T, &BusinessEvent) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        self.on(actions::DELETE, callback)
    }

    /// Handle `action`, replacing any callback registered for it.
    pub fn on<F, R>(self, action: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&T, &BusinessEvent) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        self.on_actions([action.into()], callback)
    }

    /// Handle every action in `actions` with the same callback.
    pub fn on_actions<I, S, F, R>(mut self, actions: I, callback: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&T, &BusinessEvent) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        let shared: Callback<T> = Arc::new(move |payload: &T, event: &BusinessEvent| {
            callback(payload, event).into_result()
        });
        for action in actions {
            self.callbacks.insert(action.into(), Arc::clone(&shared));
        }
        self
    }

    /// Handle every action without a registered callback.
    pub fn on_unhandled<F, R>(mut self, fallback: F) -> Self
    where
        F: Fn(&str, &T, &BusinessEvent) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        self.fallback = Some(Arc::new(
            move |action: &str, payload: &T, event: &BusinessEvent| {
                fallback(action, payload, event).into_result()
            },
        ));
        self
    }

    /// Returns `true` if a callback is registered for `action`.
    pub fn handles(&self, action: &str) -> bool {
        self.callbacks.contains_key(action)
    }
}

impl<T: Describe> Default for TypedListener<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Describe> BusinessEventListener for TypedListener<T> {
    fn on_event(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        let Some(payload) = event.payload_as::<T>() else {
            return Ok(());
        };
        let action = event.action();
        debug!(id = %event.id(), action, payload = std::any::type_name::<T>(), "received event of desired type");

        match self.callbacks.get(action) {
            Some(callback) => callback(payload, event),
            None => {
                debug!(id = %event.id(), action, "no callback for action");
                match &self.fallback {
                    Some(fallback) => fallback(action, payload, event),
                    None => Ok(()),
                }
            }
        }
    }
}

impl<T> fmt::Debug for TypedListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedListener")
            .field("payload_type", &std::any::type_name::<T>())
            .field("actions", &self.callbacks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
