//! Runtime dispatch to a bound listener method.

use super::{ListenerBinding, ListenerConfig, ListenerMethod, OwnerResolver};
use herald_core::{BoxError, BusinessEvent, BusinessEventListener, DispatchError};
use std::{fmt, sync::Arc};
use tracing::{debug, trace};

/// Delivers events to one listener method.
///
/// An event is ignored unless its payload is assignable to the configured
/// payload type and its action is accepted. The owning instance is looked up
/// on every delivery, so owners may be registered or replaced after the
/// adapter was created. Errors returned by the method reach the publisher
/// unchanged.
#[derive(Clone)]
pub struct MethodListenerAdapter {
    owner_name: String,
    owners: Arc<dyn OwnerResolver>,
    method: ListenerMethod,
    config: ListenerConfig,
    binding: ListenerBinding,
}

impl MethodListenerAdapter {
    pub(crate) fn new(
        owner_name: String,
        owners: Arc<dyn OwnerResolver>,
        method: ListenerMethod,
        config: ListenerConfig,
        binding: ListenerBinding,
    ) -> Self {
        Self {
            owner_name,
            owners,
            method,
            config,
            binding,
        }
    }

    /// Returns `true` if the event passes both the payload and the action
    /// filter.
    pub fn accepts(&self, event: &BusinessEvent) -> bool {
        self.config
            .payload_type()
            .is_assignable_from(&event.payload().payload_type())
            && self.config.accepts_action(event.action())
    }

    /// The name the owner is resolved by.
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// The listener method.
    pub fn method(&self) -> &ListenerMethod {
        &self.method
    }

    /// The parameter binding.
    pub fn binding(&self) -> &ListenerBinding {
        &self.binding
    }
}

impl BusinessEventListener for MethodListenerAdapter {
    fn on_event(&self, event: &BusinessEvent) -> Result<(), BoxError> {
        if !self.accepts(event) {
            trace!(
                listener = self.method.name(),
                action = event.action(),
                payload = event.payload().type_name(),
                "event filtered out"
            );
            return Ok(());
        }

        let owner = self
            .owners
            .resolve_owner(&self.owner_name)
            .ok_or_else(|| DispatchError::OwnerUnavailable {
                owner: self.owner_name.clone(),
            })?;
        debug!(
            owner = %self.owner_name,
            listener = self.method.name(),
            id = %event.id(),
            "invoking business event listener"
        );
        let arguments = self.binding.arguments(event);
        self.method.invoke(&self.owner_name, &*owner, &arguments)
    }
}

impl fmt::Debug for MethodListenerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodListenerAdapter")
            .field("owner_name", &self.owner_name)
            .field("method", &self.method)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}
