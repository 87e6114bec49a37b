//! Payload unwrapper implementations.
//!
//! - [`OptionalUnwrapper`] - `Option<T>` yields zero or one payload
//! - [`CollectionUnwrapper`] - collections yield one payload per element
//! - [`CompositeUnwrapper`] - an ordered chain where the first claim wins

mod collection;
mod composite;
mod optional;

pub use collection::CollectionUnwrapper;
pub use composite::{CompositeUnwrapper, UnwrapperChainBuilder, UnwrapperList};
pub use optional::OptionalUnwrapper;
