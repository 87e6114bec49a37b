//! Unwrapping of collections.

use herald_core::{JoinPoint, PayloadUnwrapper, Payloads, SharedPayload};

/// Unwraps collection payloads into one payload per element, in iteration
/// order. Arrays and boxed slices are not collections and are declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionUnwrapper;

impl PayloadUnwrapper for CollectionUnwrapper {
    fn unwrap_payload<'p>(
        &self,
        payload: &'p SharedPayload,
        _join_point: &JoinPoint<'_>,
    ) -> Option<Payloads<'p>> {
        payload.as_collection()
    }
}
