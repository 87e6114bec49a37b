//! Event construction.

use super::ActionResolver;
use herald_core::{
    BusinessEvent, EmissionError, JoinPoint, NoopUnwrapper, PayloadUnwrapper, SharedPayload,
};
use std::{fmt, iter, sync::Arc};
use tracing::trace;

/// Builds the event for one unwrapped payload.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a BusinessEventFactory",
    label = "missing `BusinessEventFactory` implementation",
    note = "Implement `BusinessEventFactory` to control how events are built."
)]
pub trait BusinessEventFactory: Send + Sync {
    /// Builds the event carrying `payload`. `wrapped_payload` is the value the
    /// intercepted call returned before unwrapping.
    fn create_event(
        &self,
        payload: SharedPayload,
        wrapped_payload: &SharedPayload,
        join_point: &JoinPoint<'_>,
    ) -> Result<BusinessEvent, EmissionError>;
}

/// The standard factory: a fresh id, the current time, empty metadata and an
/// action computed by an [`ActionResolver`].
#[derive(Debug, Clone, Default)]
pub struct DefaultEventFactory {
    actions: ActionResolver,
}

impl DefaultEventFactory {
    /// A factory resolving actions with `actions`.
    pub fn new(actions: ActionResolver) -> Self {
        Self { actions }
    }

    /// The action resolver.
    pub fn action_resolver(&self) -> &ActionResolver {
        &self.actions
    }
}

impl BusinessEventFactory for DefaultEventFactory {
    fn create_event(
        &self,
        payload: SharedPayload,
        wrapped_payload: &SharedPayload,
        join_point: &JoinPoint<'_>,
    ) -> Result<BusinessEvent, EmissionError> {
        let action = self
            .actions
            .resolve_action(&payload, wrapped_payload, join_point)?;
        let event = BusinessEvent::builder()
            .shared_payload(payload)
            .action(action)
            .build()?;
        trace!(id = %event.id(), action = event.action(), payload = event.payload().type_name(), "created business event");
        Ok(event)
    }
}

impl<F: BusinessEventFactory + ?Sized> BusinessEventFactory for Arc<F> {
    fn create_event(
        &self,
        payload: SharedPayload,
        wrapped_payload: &SharedPayload,
        join_point: &JoinPoint<'_>,
    ) -> Result<BusinessEvent, EmissionError> {
        (**self).create_event(payload, wrapped_payload, join_point)
    }
}

/// Turns an intercepted call's return value into events.
///
/// A null return yields no events. With `skip_unwrap` the return value is the
/// only payload. Otherwise the unwrapper chain expands it, and a value no
/// unwrapper claims becomes the only payload. One event is built per payload,
/// in the order the chain yields them.
#[derive(Clone)]
pub struct BusinessEventsFactory {
    unwrapper: Arc<dyn PayloadUnwrapper>,
    event_factory: Arc<dyn BusinessEventFactory>,
}

impl BusinessEventsFactory {
    /// A factory expanding payloads with `unwrapper` and building events with
    /// `event_factory`.
    pub fn new(
        unwrapper: Arc<dyn PayloadUnwrapper>,
        event_factory: Arc<dyn BusinessEventFactory>,
    ) -> Self {
        Self {
            unwrapper,
            event_factory,
        }
    }

    /// The unwrapper chain.
    pub fn unwrapper(&self) -> &Arc<dyn PayloadUnwrapper> {
        &self.unwrapper
    }

    /// Builds every event for `return_value`. `None` stands for a null return.
    ///
    /// # Errors
    ///
    /// The first failure stops construction; no partial list is returned.
    pub fn create_events(
        &self,
        return_value: Option<&SharedPayload>,
        join_point: &JoinPoint<'_>,
    ) -> Result<Vec<BusinessEvent>, EmissionError> {
        let Some(wrapped) = return_value else {
            trace!(signature = %join_point.signature(), "null return value, no events");
            return Ok(Vec::new());
        };

        let payloads: Box<dyn Iterator<Item = SharedPayload> + '_> =
            if join_point.config().skip_unwrap {
                Box::new(iter::once(Arc::clone(wrapped)))
            } else {
                self.unwrapper
                    .unwrap_payload(wrapped, join_point)
                    .unwrap_or_else(|| Box::new(iter::once(Arc::clone(wrapped))))
            };

        payloads
            .map(|payload| self.event_factory.create_event(payload, wrapped, join_point))
            .collect()
    }
}

impl Default for BusinessEventsFactory {
    fn default() -> Self {
        Self::new(Arc::new(NoopUnwrapper), Arc::new(DefaultEventFactory::default()))
    }
}

impl fmt::Debug for BusinessEventsFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessEventsFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unwrappers::CompositeUnwrapper;
    use herald_core::{EmitConfig, MethodSignature, actions};

    struct Inventory;

    fn factory() -> BusinessEventsFactory {
        BusinessEventsFactory::new(
            Arc::new(CompositeUnwrapper::with_defaults()),
            Arc::new(DefaultEventFactory::default()),
        )
    }

    fn create(config: EmitConfig, value: Option<SharedPayload>) -> Vec<BusinessEvent> {
        let signature = MethodSignature::new("Inventory", "load").returning_named("Items");
        let join_point = JoinPoint::new(&Inventory, &signature, &config);
        factory().create_events(value.as_ref(), &join_point).unwrap()
    }

    fn strings(events: &[BusinessEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| event.payload_as::<String>().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_collection_yields_one_event_per_element_in_order() {
        let value: SharedPayload = Arc::new(vec!["a".to_string(), "b".to_string()]);
        let events = create(EmitConfig::default().action("ADDED"), Some(value));
        assert_eq!(strings(&events), ["a", "b"]);
        assert!(events.iter().all(|event| event.action() == "ADDED"));
        assert_ne!(events[0].id(), events[1].id());
    }

    #[test]
    fn test_skip_unwrap_emits_value_as_is() {
        let value: SharedPayload = Arc::new(vec!["a".to_string(), "b".to_string()]);
        let events = create(EmitConfig::default().skip_unwrap(true), Some(value));
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload_as::<Vec<String>>().unwrap(),
            &vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_null_return_yields_nothing() {
        assert!(create(EmitConfig::default(), None).is_empty());
    }

    #[test]
    fn test_unclaimed_value_is_the_single_payload() {
        let events = create(EmitConfig::default(), Some(Arc::new(7_u32)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload_as::<u32>(), Some(&7));
        assert_eq!(events[0].action(), actions::NONE);
    }

    #[test]
    fn test_empty_option_and_empty_collection_yield_nothing() {
        assert!(create(EmitConfig::default(), Some(Arc::new(None::<String>))).is_empty());
        assert!(create(EmitConfig::default(), Some(Arc::new(Vec::<String>::new()))).is_empty());
    }

    #[test]
    fn test_expression_sees_wrapped_payload() {
        let value: SharedPayload = Arc::new(vec!["a".to_string(), "b".to_string()]);
        let config = EmitConfig::default().action_expression(r#"if(len(wrappedPayload) > 1, payload + "/many", payload)"#);
        let events = create(config, Some(value));
        assert_eq!(events[0].action(), "a/many");
        assert_eq!(events[1].action(), "b/many");
    }

    #[test]
    fn test_expression_failure_stops_construction() {
        let signature = MethodSignature::new("Inventory", "load").returning_named("Items");
        let config = EmitConfig::default().action_expression("payload.missing");
        let join_point = JoinPoint::new(&Inventory, &signature, &config);
        let value: SharedPayload = Arc::new("a".to_string());
        let error = factory().create_events(Some(&value), &join_point).unwrap_err();
        assert!(matches!(error, EmissionError::Expression(_)));
    }
}
