//! Wiring from settings.
//!
//! [`BusinessEvents`] assembles the emission and listener components once,
//! from [`BusinessEventsSettings`] plus any custom collaborators, and hands
//! them out afterwards.

use crate::{
    emission::{ActionResolver, BusinessEventEmitter, BusinessEventFactory, BusinessEventsFactory, DefaultEventFactory},
    expression::SimpleExpressionParser,
    listen::{BusinessEventListenerFactory, OwnerRegistry, OwnerResolver},
    settings::BusinessEventsSettings,
    unwrappers::{CompositeUnwrapper, UnwrapperList},
};
use herald_core::{
    EventPublisher, ExpressionParser, NoResolver, NoopUnwrapper, PayloadUnwrapper, Resolver,
};
use std::{fmt, sync::Arc};
use tracing::debug;

type Modifier = Box<dyn FnOnce(UnwrapperList) -> UnwrapperList>;

/// The assembled components.
///
/// # Example
///
/// ```rust,ignore
/// let events = BusinessEvents::builder(BusinessEventsSettings::load(None)?)
///     .resolver(Arc::new(MapResolver::new().with("defaults", defaults)))
///     .unwrapper(PageUnwrapper)
///     .build();
///
/// let emitter = events.emitter(Arc::new(registry));
/// ```
#[derive(Clone)]
pub struct BusinessEvents {
    settings: BusinessEventsSettings,
    unwrapper: Arc<dyn PayloadUnwrapper>,
    events_factory: Option<BusinessEventsFactory>,
    listener_factory: Option<BusinessEventListenerFactory>,
}

impl BusinessEvents {
    /// A builder for `settings`.
    pub fn builder(settings: BusinessEventsSettings) -> BusinessEventsBuilder {
        BusinessEventsBuilder::new(settings)
    }

    /// The settings the components were built from.
    pub fn settings(&self) -> &BusinessEventsSettings {
        &self.settings
    }

    /// The unwrapper chain, or [`NoopUnwrapper`] when unwrapping is disabled.
    pub fn unwrapper(&self) -> &Arc<dyn PayloadUnwrapper> {
        &self.unwrapper
    }

    /// The events factory. `None` when emission is disabled.
    pub fn events_factory(&self) -> Option<&BusinessEventsFactory> {
        self.events_factory.as_ref()
    }

    /// An emitter publishing to `publisher`. `None` when emission is disabled.
    pub fn emitter(&self, publisher: Arc<dyn EventPublisher>) -> Option<BusinessEventEmitter> {
        self.events_factory.as_ref().map(|events| {
            BusinessEventEmitter::new(events.clone(), publisher)
                .with_order(self.settings.emission.aspect.order)
        })
    }

    /// The listener factory. `None` when listening is disabled.
    pub fn listener_factory(&self) -> Option<&BusinessEventListenerFactory> {
        self.listener_factory.as_ref()
    }
}

impl fmt::Debug for BusinessEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessEvents")
            .field("settings", &self.settings)
            .field("emission", &self.events_factory.is_some())
            .field("listen", &self.listener_factory.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`BusinessEvents`].
pub struct BusinessEventsBuilder {
    settings: BusinessEventsSettings,
    parser: Arc<dyn ExpressionParser>,
    resolver: Arc<dyn Resolver>,
    unwrappers: UnwrapperList,
    modifiers: Vec<Modifier>,
    event_factory: Option<Arc<dyn BusinessEventFactory>>,
    owners: Option<Arc<dyn OwnerResolver>>,
}

impl BusinessEventsBuilder {
    /// A builder using the built-in expression language, no external
    /// references, the default unwrappers and an empty [`OwnerRegistry`].
    pub fn new(settings: BusinessEventsSettings) -> Self {
        Self {
            settings,
            parser: Arc::new(SimpleExpressionParser),
            resolver: Arc::new(NoResolver),
            unwrappers: Vec::new(),
            modifiers: Vec::new(),
            event_factory: None,
            owners: None,
        }
    }

    /// Use a different expression language.
    pub fn expression_parser(mut self, parser: Arc<dyn ExpressionParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Resolve `ref("name")` calls in action expressions through `resolver`.
    pub fn resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Append a custom unwrapper after the built-in ones.
    pub fn unwrapper<U: PayloadUnwrapper + 'static>(mut self, unwrapper: U) -> Self {
        self.unwrappers.push(Arc::new(unwrapper));
        self
    }

    /// Rearrange the assembled unwrapper list.
    pub fn modify_unwrappers<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(UnwrapperList) -> UnwrapperList + 'static,
    {
        self.modifiers.push(Box::new(modifier));
        self
    }

    /// Replace the per-payload event factory. Expression settings are then
    /// the factory's own concern.
    pub fn event_factory(mut self, factory: Arc<dyn BusinessEventFactory>) -> Self {
        self.event_factory = Some(factory);
        self
    }

    /// Resolve listener owners through `owners`.
    pub fn owners(mut self, owners: Arc<dyn OwnerResolver>) -> Self {
        self.owners = Some(owners);
        self
    }

    /// Assemble the components.
    pub fn build(self) -> BusinessEvents {
        let settings = self.settings;
        let unwrapper = Self::unwrapper_chain(&settings, self.unwrappers, self.modifiers);

        let events_factory = (settings.enabled && settings.emission.enabled).then(|| {
            let event_factory = self.event_factory.unwrap_or_else(|| {
                Arc::new(DefaultEventFactory::new(
                    ActionResolver::new()
                        .with_parser(self.parser)
                        .with_resolver(self.resolver)
                        .with_cache_capacity(settings.emission.expression_cache_capacity),
                ))
            });
            BusinessEventsFactory::new(Arc::clone(&unwrapper), event_factory)
        });

        let listener_factory = (settings.enabled && settings.listen.enabled).then(|| {
            let owners = self
                .owners
                .unwrap_or_else(|| Arc::new(OwnerRegistry::new()));
            BusinessEventListenerFactory::new(owners)
        });

        debug!(
            emission = events_factory.is_some(),
            listen = listener_factory.is_some(),
            "business events configured"
        );
        BusinessEvents {
            settings,
            unwrapper,
            events_factory,
            listener_factory,
        }
    }

    fn unwrapper_chain(
        settings: &BusinessEventsSettings,
        custom: UnwrapperList,
        modifiers: Vec<Modifier>,
    ) -> Arc<dyn PayloadUnwrapper> {
        let unwrapping = &settings.emission.unwrapping;
        if !unwrapping.enabled {
            return Arc::new(NoopUnwrapper);
        }
        let builder = custom.into_iter().fold(
            CompositeUnwrapper::builder()
                .unwrap_optionals(unwrapping.unwrap.optionals)
                .unwrap_collections(unwrapping.unwrap.collections),
            |builder, unwrapper| builder.shared_unwrapper(unwrapper),
        );
        let builder = modifiers
            .into_iter()
            .fold(builder, |builder, modifier| builder.modify(modifier));
        Arc::new(builder.build())
    }
}

impl fmt::Debug for BusinessEventsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessEventsBuilder")
            .field("settings", &self.settings)
            .field("unwrappers", &self.unwrappers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BusinessEventRecorder;
    use herald_core::{EmitConfig, JoinPoint, MapResolver, MethodSignature, SharedPayload};

    struct Shelf;

    fn emit(events: &BusinessEvents, config: EmitConfig, value: SharedPayload) -> BusinessEventRecorder {
        let recorder = BusinessEventRecorder::new();
        let emitter = events.emitter(Arc::new(recorder.clone())).unwrap();
        let signature = MethodSignature::new("Shelf", "stock").returning_named("Stock");
        emitter
            .emit(&value, &JoinPoint::new(&Shelf, &signature, &config))
            .unwrap();
        recorder
    }

    #[test]
    fn test_defaults_enable_everything() {
        let events = BusinessEvents::builder(BusinessEventsSettings::default()).build();
        assert!(events.listener_factory().is_some());
        let emitter = events.emitter(Arc::new(BusinessEventRecorder::new())).unwrap();
        assert_eq!(emitter.order(), BusinessEventEmitter::DEFAULT_ORDER);

        let value: SharedPayload = Arc::new(vec![1_u8, 2, 3]);
        emit(&events, EmitConfig::default(), value).assert_that().count(3);
    }

    #[test]
    fn test_disabled_sections_yield_nothing() {
        let mut settings = BusinessEventsSettings::default();
        settings.emission.enabled = false;
        let events = BusinessEvents::builder(settings).build();
        assert!(events.emitter(Arc::new(BusinessEventRecorder::new())).is_none());
        assert!(events.listener_factory().is_some());

        let mut settings = BusinessEventsSettings::default();
        settings.enabled = false;
        let events = BusinessEvents::builder(settings).build();
        assert!(events.events_factory().is_none());
        assert!(events.listener_factory().is_none());
    }

    #[test]
    fn test_unwrapping_switches() {
        let mut settings = BusinessEventsSettings::default();
        settings.emission.unwrapping.enabled = false;
        let events = BusinessEvents::builder(settings).build();
        let value: SharedPayload = Arc::new(vec![1_u8, 2, 3]);
        emit(&events, EmitConfig::default(), value).assert_that().count(1);

        let mut settings = BusinessEventsSettings::default();
        settings.emission.unwrapping.unwrap.collections = false;
        let events = BusinessEvents::builder(settings).build();
        let value: SharedPayload = Arc::new(Some(vec![1_u8, 2, 3]));
        emit(&events, EmitConfig::default(), value)
            .assert_that()
            .one_emitted()
            .exactly_one_with_payload(&vec![1_u8, 2, 3]);
    }

    #[test]
    fn test_custom_resolver_and_modifiers() {
        let events = BusinessEvents::builder(BusinessEventsSettings::default())
            .resolver(Arc::new(MapResolver::new().with("verb", "STOCKED")))
            .modify_unwrappers(|_| Vec::new())
            .build();
        let value: SharedPayload = Arc::new(vec![1_u8, 2]);
        emit(&events, EmitConfig::default().action_expression(r#"ref("verb")"#), value)
            .assert_that()
            .exactly_one_with_action("STOCKED");
    }

    #[test]
    fn test_order_from_settings() {
        let mut settings = BusinessEventsSettings::default();
        settings.emission.aspect.order = 7;
        let events = BusinessEvents::builder(settings).build();
        assert_eq!(events.emitter(Arc::new(BusinessEventRecorder::new())).unwrap().order(), 7);
    }
}
