//! # herald - Business Event Emission and Dispatch
//!
//! `herald` turns the return values of domain operations into
//! [`BusinessEvent`]s and delivers them to listeners in the same process,
//! synchronously, before the operation returns.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//! use serde::Serialize;
//!
//! #[derive(Debug, Clone, Serialize, Payload)]
//! struct Order { id: u64 }
//!
//! struct OrderService { emitter: Option<BusinessEventEmitter> }
//!
//! impl EmitsBusinessEvents for OrderService {
//!     fn business_event_emitter(&self) -> Option<&BusinessEventEmitter> {
//!         self.emitter.as_ref()
//!     }
//! }
//!
//! impl OrderService {
//!     #[emit_business_event(action = "CREATE")]
//!     fn place(&self, id: u64) -> Result<Order, HeraldError> {
//!         Ok(Order { id })
//!     }
//! }
//!
//! let registry = ListenerRegistry::builder()
//!     .register(TypedListener::<Order>::new().on_create(|order: &Order, _: &BusinessEvent| {
//!         println!("order {} placed", order.id);
//!     }))
//!     .build();
//!
//! let events = BusinessEvents::builder(BusinessEventsSettings::default()).build();
//! let service = OrderService { emitter: events.emitter(Arc::new(registry)) };
//! service.place(7)?;
//! ```
//!
//! ## Pipeline
//!
//! 1. The [`BusinessEventEmitter`] runs the operation.
//! 2. The unwrapper chain expands the return value into payloads.
//! 3. The event factory resolves an action for every payload.
//! 4. The [`EventPublisher`] delivers every event, in order.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use herald_core::{
    // Events
    BusinessEvent,
    BusinessEventBuilder,
    // Listener seams
    Argument,
    BusinessEventListener,
    ListenerArgument,
    ListenerOutcome,
    Role,
    // Error types
    BoxError,
    DispatchError,
    EmissionError,
    EventError,
    ExpressionError,
    HeraldError,
    ListenerError,
    SettingsError,
    UnboundParameter,
    // Payloads
    Describe,
    Nullable,
    Payload,
    ReturnValue,
    SharedPayload,
    Supertype,
    TypeDescriptor,
    View,
    // Interception
    EmitConfig,
    JoinPoint,
    MethodSignature,
    // Seams
    EvaluationContext,
    EventPublisher,
    Expression,
    ExpressionParser,
    MapResolver,
    NoResolver,
    NoopUnwrapper,
    PayloadUnwrapper,
    Payloads,
    Resolver,
    actions,
    impl_payload,
};

#[doc(hidden)]
pub use herald_core::__private;

pub use herald_std::{
    emission::{BusinessEventEmitter, EmitsBusinessEvents},
    registry::{ListenerRegistry, ListenerRegistryBuilder},
    settings::BusinessEventsSettings,
    setup::{BusinessEvents, BusinessEventsBuilder},
};

#[cfg(feature = "macros")]
pub use herald_macros::{Payload, emit_business_event};

/// Turning return values into events.
pub mod emission {
    pub use herald_std::emission::{
        ActionResolver, BusinessEventEmitter, BusinessEventFactory, BusinessEventsFactory,
        DefaultEventFactory, EmitsBusinessEvents,
    };
}

/// The built-in action expression language.
pub mod expression {
    pub use herald_std::expression::{REFERENCE_FUNCTION, SimpleExpressionParser};
}

/// Listener methods, binding and typed listeners.
pub mod listen {
    pub use herald_std::listen::{
        BusinessEventListenerFactory, ListenerBinding, ListenerConfig, ListenerFn,
        ListenerMethod, MethodListenerAdapter, OwnerRegistry, OwnerResolver, SharedOwner,
        TypedListener,
    };
}

/// Listener registration.
pub mod registry {
    pub use herald_std::registry::{
        ListenerEntry, ListenerRegistration, ListenerRegistry, ListenerRegistryBuilder,
    };
}

/// Configuration.
pub mod settings {
    pub use herald_std::settings::{
        AspectSettings, BusinessEventsSettings, ENV_PREFIX, EmissionSettings, ListenSettings,
        UnwrapSettings, UnwrappingSettings,
    };
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use herald_std::testing::*;
}

/// Payload unwrappers.
pub mod unwrappers {
    pub use herald_std::unwrappers::{
        CollectionUnwrapper, CompositeUnwrapper, OptionalUnwrapper, UnwrapperChainBuilder,
        UnwrapperList,
    };
}

/// Prelude module - common imports for Herald.
///
/// # Usage
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        BoxError,
        BusinessEvent,
        BusinessEventListener,
        EventPublisher,
        HeraldError,
        Nullable,
        Payload,
        SharedPayload,
        actions,
        // Emission
        BusinessEventEmitter,
        BusinessEvents,
        BusinessEventsSettings,
        EmitsBusinessEvents,
        // Listening
        ListenerRegistry,
        listen::{ListenerConfig, ListenerMethod, TypedListener},
    };

    #[cfg(feature = "macros")]
    pub use crate::emit_business_event;

    pub use std::sync::Arc;
}
