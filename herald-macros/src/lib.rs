//! Procedural macros for Herald.
//!
//! - `#[derive(Payload)]` - Implements `Payload` and `Describe`
//! - `#[emit_business_event]` - Publishes business events for a method's
//!   return value

use proc_macro::TokenStream;

mod emit;
mod payload;

/// Derive macro implementing `Payload` and `Describe`.
///
/// The type must implement `Debug`, `Clone` and, unless marked
/// `#[payload(opaque)]`, `serde::Serialize`.
///
/// # Attributes
///
/// - `#[payload(extends)]` on a field declares the field's type as a
///   supertype: listeners for the field's type also receive this payload
/// - `#[payload(opaque)]` on the type exposes the payload to action
///   expressions as its `Debug` text instead of its serialized form
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Serialize, Payload)]
/// struct Employee {
///     #[payload(extends)]
///     person: Person,
///     team: String,
/// }
/// ```
#[proc_macro_derive(Payload, attributes(payload))]
pub fn derive_payload(input: TokenStream) -> TokenStream {
    payload::derive_payload_impl(input)
}

/// Publishes a business event for every payload the method returns.
///
/// The method must take `&self`, return `Result<T, E>` with a non-unit `T`,
/// and live on a type implementing `EmitsBusinessEvents`. `E` must implement
/// `From<EmissionError>`.
///
/// # Arguments
///
/// - `action = "..."` - static action
/// - `action_expression = "..."` - expression computing the action
/// - `skip_unwrap` - emit the return value as one payload
///
/// ```rust,ignore
/// impl OrderService {
///     #[emit_business_event(action = "CREATE")]
///     fn place(&self, order: Order) -> Result<Order, HeraldError> {
///         self.repository.save(order)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn emit_business_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    emit::emit_business_event_impl(attr, item)
}
