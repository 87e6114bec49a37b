//! Listener registration.

use super::{ListenerBinding, ListenerMethod, MethodListenerAdapter};
use herald_core::ListenerError;
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

/// A listener's owning instance.
pub type SharedOwner = Arc<dyn Any + Send + Sync>;

/// Looks up listener owners by name.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an OwnerResolver",
    label = "missing `OwnerResolver` implementation",
    note = "Implement `OwnerResolver` or use `OwnerRegistry`."
)]
pub trait OwnerResolver: Send + Sync {
    /// The instance registered as `name`, if any.
    fn resolve_owner(&self, name: &str) -> Option<SharedOwner>;
}

/// A named set of listener owners.
///
/// Owners may be registered at any time, including after listeners for them
/// were created.
#[derive(Default)]
pub struct OwnerRegistry {
    owners: RwLock<HashMap<String, SharedOwner>>,
}

impl OwnerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `owner` as `name`, replacing any previous owner.
    pub fn register<T: Any + Send + Sync>(&self, name: impl Into<String>, owner: Arc<T>) {
        self.owners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), owner);
    }

    /// Removes the owner registered as `name`.
    pub fn remove(&self, name: &str) -> Option<SharedOwner> {
        self.owners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }
}

impl OwnerResolver for OwnerRegistry {
    fn resolve_owner(&self, name: &str) -> Option<SharedOwner> {
        self.owners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl<R: OwnerResolver + ?Sized> OwnerResolver for Arc<R> {
    fn resolve_owner(&self, name: &str) -> Option<SharedOwner> {
        (**self).resolve_owner(name)
    }
}

impl fmt::Debug for OwnerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owners = self.owners.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("OwnerRegistry")
            .field("owners", &owners.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Turns listener methods into [`MethodListenerAdapter`]s.
#[derive(Clone)]
pub struct BusinessEventListenerFactory {
    owners: Arc<dyn OwnerResolver>,
}

impl BusinessEventListenerFactory {
    /// A factory resolving owners through `owners`.
    pub fn new(owners: Arc<dyn OwnerResolver>) -> Self {
        Self { owners }
    }

    /// Returns `true` if `method` carries the listener marker.
    pub fn supports_method(&self, method: &ListenerMethod) -> bool {
        method.is_listener()
    }

    /// Binds `method` and wraps it in an adapter for the owner registered as
    /// `owner_name`.
    ///
    /// # Errors
    ///
    /// - [`ListenerError::NotAListener`] if `method` has no listener marker
    /// - [`ListenerError::Unbindable`] if any parameter has no role
    pub fn create_listener(
        &self,
        owner_name: impl Into<String>,
        method: &ListenerMethod,
    ) -> Result<MethodListenerAdapter, ListenerError> {
        let config = method
            .config()
            .cloned()
            .ok_or_else(|| ListenerError::NotAListener {
                method: method.qualified_name(),
            })?;
        let binding = ListenerBinding::bind(
            &method.qualified_name(),
            method.parameter_types(),
            &config.payload_type(),
        )?;
        let owner_name = owner_name.into();
        debug!(
            owner = %owner_name,
            listener = %method.qualified_name(),
            roles = ?binding.roles(),
            "registered business event listener"
        );
        Ok(MethodListenerAdapter::new(
            owner_name,
            Arc::clone(&self.owners),
            method.clone(),
            config,
            binding,
        ))
    }
}

impl fmt::Debug for BusinessEventListenerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessEventListenerFactory").finish_non_exhaustive()
    }
}
