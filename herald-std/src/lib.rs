//! # herald-std
//!
//! Standard implementations for the Herald business event framework.
//!
//! This crate provides:
//! - **Unwrapping**: [`OptionalUnwrapper`](unwrappers::OptionalUnwrapper),
//!   [`CollectionUnwrapper`](unwrappers::CollectionUnwrapper) and the ordered
//!   [`CompositeUnwrapper`](unwrappers::CompositeUnwrapper)
//! - **Expressions**: `evalexpr`-backed action expressions with dotted
//!   context variables and `ref("name")` lookups
//! - **Emission**: action resolution, event factories and the
//!   [`BusinessEventEmitter`](emission::BusinessEventEmitter)
//! - **Listening**: parameter binding, method adapters and typed listeners
//! - **Registry**: an in-process [`ListenerRegistry`](registry::ListenerRegistry)
//!   publisher
//! - **Settings** and **setup** wiring, plus **testing** utilities

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use herald_core;

// Modules
pub mod emission;
pub mod expression;
pub mod listen;
pub mod registry;
pub mod settings;
pub mod setup;
pub mod testing;
pub mod unwrappers;
