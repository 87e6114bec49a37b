//! The listener side.
//!
//! Listener methods are described once with [`ListenerMethod`], bound to roles
//! by [`ListenerBinding`] when [`BusinessEventListenerFactory`] registers them,
//! and invoked per event by [`MethodListenerAdapter`]. [`TypedListener`] is the
//! closure-based alternative for a single payload type.

mod adapter;
mod binder;
mod factory;
mod method;
mod typed;

pub use adapter::MethodListenerAdapter;
pub use binder::ListenerBinding;
pub use factory::{BusinessEventListenerFactory, OwnerRegistry, OwnerResolver, SharedOwner};
pub use method::{ListenerConfig, ListenerFn, ListenerMethod};
pub use typed::TypedListener;
