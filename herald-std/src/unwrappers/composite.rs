//! The ordered unwrapper chain.

use super::{CollectionUnwrapper, OptionalUnwrapper};
use herald_core::{JoinPoint, PayloadUnwrapper, Payloads, SharedPayload};
use std::{fmt, sync::Arc};

/// A list of unwrappers, in priority order.
pub type UnwrapperList = Vec<Arc<dyn PayloadUnwrapper>>;

type Modifier = Box<dyn FnOnce(UnwrapperList) -> UnwrapperList>;

/// Tries each child unwrapper in order and returns the result of the first
/// one that claims the payload.
///
/// The chain itself never falls back: when no child claims a payload it
/// returns `None`, and the caller decides to emit the payload as-is.
#[derive(Clone, Default)]
pub struct CompositeUnwrapper {
    delegates: UnwrapperList,
}

impl CompositeUnwrapper {
    /// A chain over `delegates`, in the given order.
    pub fn new(delegates: UnwrapperList) -> Self {
        Self { delegates }
    }

    /// The default chain: optionals, then collections.
    pub fn with_defaults() -> Self {
        Self::builder().build()
    }

    /// A builder starting from the default chain.
    pub fn builder() -> UnwrapperChainBuilder {
        UnwrapperChainBuilder::new()
    }

    /// The child unwrappers.
    pub fn delegates(&self) -> &[Arc<dyn PayloadUnwrapper>] {
        &self.delegates
    }

    /// Get the number of child unwrappers.
    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    /// Check if the chain has no child unwrappers.
    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl PayloadUnwrapper for CompositeUnwrapper {
    fn unwrap_payload<'p>(
        &self,
        payload: &'p SharedPayload,
        join_point: &JoinPoint<'_>,
    ) -> Option<Payloads<'p>> {
        self.delegates
            .iter()
            .find_map(|unwrapper| unwrapper.unwrap_payload(payload, join_point))
    }
}

impl fmt::Debug for CompositeUnwrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeUnwrapper")
            .field("delegates", &self.delegates.len())
            .finish()
    }
}

/// Assembles a [`CompositeUnwrapper`] once during setup.
///
/// Built-in unwrappers come first, custom unwrappers follow in registration
/// order, then every modifier is applied to the complete list.
///
/// # Example
/// ```ignore
/// let chain = CompositeUnwrapper::builder()
///     .unwrap_collections(false)
///     .unwrapper(PageUnwrapper)
///     .modify(|mut list| {
///         list.reverse();
///         list
///     })
///     .build();
/// ```
pub struct UnwrapperChainBuilder {
    unwrap_optionals: bool,
    unwrap_collections: bool,
    custom: UnwrapperList,
    modifiers: Vec<Modifier>,
}

impl UnwrapperChainBuilder {
    /// A builder with both built-in unwrappers enabled.
    pub fn new() -> Self {
        Self {
            unwrap_optionals: true,
            unwrap_collections: true,
            custom: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// Include the [`OptionalUnwrapper`].
    pub fn unwrap_optionals(mut self, enabled: bool) -> Self {
        self.unwrap_optionals = enabled;
        self
    }

    /// Include the [`CollectionUnwrapper`].
    pub fn unwrap_collections(mut self, enabled: bool) -> Self {
        self.unwrap_collections = enabled;
        self
    }

    /// Append a custom unwrapper.
    pub fn unwrapper<U: PayloadUnwrapper + 'static>(mut self, unwrapper: U) -> Self {
        self.custom.push(Arc::new(unwrapper));
        self
    }

    /// Append an already shared unwrapper.
    pub fn shared_unwrapper(mut self, unwrapper: Arc<dyn PayloadUnwrapper>) -> Self {
        self.custom.push(unwrapper);
        self
    }

    /// Register a modifier applied to the assembled list.
    pub fn modify<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(UnwrapperList) -> UnwrapperList + 'static,
    {
        self.modifiers.push(Box::new(modifier));
        self
    }

    /// Build the chain.
    pub fn build(self) -> CompositeUnwrapper {
        let mut delegates: UnwrapperList = Vec::new();
        if self.unwrap_optionals {
            delegates.push(Arc::new(OptionalUnwrapper));
        }
        if self.unwrap_collections {
            delegates.push(Arc::new(CollectionUnwrapper));
        }
        delegates.extend(self.custom);

        let delegates = self
            .modifiers
            .into_iter()
            .fold(delegates, |delegates, modifier| modifier(delegates));
        CompositeUnwrapper::new(delegates)
    }
}

impl Default for UnwrapperChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unwrappers::test_support::unwrap_with;
    use herald_core::NoopUnwrapper;

    /// Claims every `u32` and doubles it.
    struct Doubling;

    impl PayloadUnwrapper for Doubling {
        fn unwrap_payload<'p>(
            &self,
            payload: &'p SharedPayload,
            _join_point: &JoinPoint<'_>,
        ) -> Option<Payloads<'p>> {
            let value = *payload.downcast_ref::<u32>()?;
            Some(Box::new(std::iter::once(Arc::new(value * 2) as SharedPayload)))
        }
    }

    /// Claims everything and yields nothing.
    struct Swallowing;

    impl PayloadUnwrapper for Swallowing {
        fn unwrap_payload<'p>(
            &self,
            _payload: &'p SharedPayload,
            _join_point: &JoinPoint<'_>,
        ) -> Option<Payloads<'p>> {
            Some(Box::new(std::iter::empty()))
        }
    }

    #[test]
    fn test_default_chain() {
        let chain = CompositeUnwrapper::with_defaults();
        assert_eq!(chain.len(), 2);

        let payloads = unwrap_with(&chain, Arc::new(vec![1_u8, 2])).unwrap();
        assert_eq!(payloads.len(), 2);
        let payloads = unwrap_with(&chain, Arc::new(Some(1_u8))).unwrap();
        assert_eq!(payloads.len(), 1);
    }

    #[test]
    fn test_unclaimed_payload_returns_none() {
        let chain = CompositeUnwrapper::with_defaults();
        assert!(unwrap_with(&chain, Arc::new("plain".to_string())).is_none());
        assert!(unwrap_with(&CompositeUnwrapper::default(), Arc::new(vec![1_u8])).is_none());
    }

    #[test]
    fn test_first_claiming_unwrapper_wins() {
        let chain = CompositeUnwrapper::new(vec![
            Arc::new(NoopUnwrapper) as Arc<dyn PayloadUnwrapper>,
            Arc::new(Doubling) as Arc<dyn PayloadUnwrapper>,
            Arc::new(Swallowing) as Arc<dyn PayloadUnwrapper>,
        ]);
        let payloads = unwrap_with(&chain, Arc::new(21_u32)).unwrap();
        assert_eq!(payloads[0].downcast_ref::<u32>(), Some(&42));

        let payloads = unwrap_with(&chain, Arc::new("other".to_string())).unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_builder_toggles_and_custom_unwrappers() {
        let chain = CompositeUnwrapper::builder()
            .unwrap_optionals(false)
            .unwrapper(Doubling)
            .build();
        assert_eq!(chain.len(), 2);
        assert!(unwrap_with(&chain, Arc::new(Some(1_u8))).is_none());
        assert!(unwrap_with(&chain, Arc::new(vec![1_u8])).is_some());
        assert!(unwrap_with(&chain, Arc::new(1_u32)).is_some());
    }

    #[test]
    fn test_modifiers_apply_in_order() {
        let chain = CompositeUnwrapper::builder()
            .unwrapper(Swallowing)
            .modify(|mut list| {
                list.insert(0, Arc::new(Doubling));
                list
            })
            .modify(|mut list| {
                list.truncate(1);
                list
            })
            .build();
        assert_eq!(chain.len(), 1);
        assert!(unwrap_with(&chain, Arc::new(vec![1_u8])).is_none());
        assert!(unwrap_with(&chain, Arc::new(2_u32)).is_some());
    }
}
