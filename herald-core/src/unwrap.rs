//! Payload unwrapping seam.

use crate::{payload::SharedPayload, signature::JoinPoint};

/// A lazy, single-pass sequence of unwrapped payloads.
pub type Payloads<'p> = Box<dyn Iterator<Item = SharedPayload> + 'p>;

/// Expands one return value into zero or more payloads.
///
/// Returning `None` means "not applicable": the next unwrapper in the chain is
/// tried. Returning an empty sequence means the value produces no events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a PayloadUnwrapper",
    label = "missing `PayloadUnwrapper` implementation",
    note = "Implement `PayloadUnwrapper` to take part in the unwrapper chain."
)]
pub trait PayloadUnwrapper: Send + Sync {
    /// Unwraps `payload`, or declines with `None`.
    fn unwrap_payload<'p>(
        &self,
        payload: &'p SharedPayload,
        join_point: &JoinPoint<'_>,
    ) -> Option<Payloads<'p>>;
}

/// An unwrapper that never claims a payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUnwrapper;

impl PayloadUnwrapper for NoopUnwrapper {
    fn unwrap_payload<'p>(
        &self,
        _payload: &'p SharedPayload,
        _join_point: &JoinPoint<'_>,
    ) -> Option<Payloads<'p>> {
        None
    }
}
