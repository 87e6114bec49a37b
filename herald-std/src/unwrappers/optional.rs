//! Unwrapping of single-value containers.

use herald_core::{JoinPoint, PayloadUnwrapper, Payloads, SharedPayload};

/// Unwraps `Option<T>` payloads.
///
/// `Some(value)` yields `value`; `None` yields nothing, so an absent optional
/// produces no events.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalUnwrapper;

impl PayloadUnwrapper for OptionalUnwrapper {
    fn unwrap_payload<'p>(
        &self,
        payload: &'p SharedPayload,
        _join_point: &JoinPoint<'_>,
    ) -> Option<Payloads<'p>> {
        let inner = payload.as_optional()?;
        Some(Box::new(inner.into_iter()))
    }
}
