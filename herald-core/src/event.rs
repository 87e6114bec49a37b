//! The business event record.

use crate::{
    descriptor::{Describe, TypeDescriptor},
    error::EventError,
    payload::{Payload, SharedPayload},
};
use std::{collections::HashMap, sync::Arc};
use time::OffsetDateTime;
use uuid::Uuid;

/// Well-known action labels.
pub mod actions {
    /// Something was created.
    pub const CREATE: &str = "CREATE";
    /// Something was updated.
    pub const UPDATE: &str = "UPDATE";
    /// Something was deleted.
    pub const DELETE: &str = "DELETE";
    /// No particular action. Used when none is configured.
    pub const NONE: &str = "NONE";
}

/// An immutable fact about a domain action.
///
/// Events are cheap to clone: the payload and the metadata are shared.
/// A "changed" event is obtained through [`BusinessEvent::to_builder`], never
/// by mutating an existing one.
///
/// # Example
///
/// ```rust,ignore
/// let event = BusinessEvent::builder()
///     .payload(order)
///     .action(actions::CREATE)
///     .add_metadata("tenant", "acme")
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct BusinessEvent {
    id: Uuid,
    payload: SharedPayload,
    action: String,
    timestamp: OffsetDateTime,
    metadata: Arc<HashMap<String, String>>,
}

impl BusinessEvent {
    /// An event for `payload` with every other field defaulted.
    pub fn with_payload<P: Payload>(payload: P) -> Self {
        Self::with_shared_payload(Arc::new(payload))
    }

    /// An event for an already shared payload with every other field defaulted.
    pub fn with_shared_payload(payload: SharedPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            action: actions::NONE.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            metadata: Arc::default(),
        }
    }

    /// A builder with no payload.
    pub fn builder() -> BusinessEventBuilder {
        BusinessEventBuilder::default()
    }

    /// A builder initialised from this event, for copy-with-overrides.
    pub fn to_builder(&self) -> BusinessEventBuilder {
        BusinessEventBuilder::from_event(self)
    }

    /// Unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The payload.
    pub fn payload(&self) -> &dyn Payload {
        &*self.payload
    }

    /// The shared payload handle.
    pub fn shared_payload(&self) -> &SharedPayload {
        &self.payload
    }

    /// Borrows the payload as a `T`, following declared supertypes.
    pub fn payload_as<T: Describe>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// The action label.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// When the event was created.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// Additional string metadata.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// A single metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl Describe for BusinessEvent {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

/// Builder for [`BusinessEvent`].
///
/// Every field except the payload has a default: a random id, the
/// [`actions::NONE`] action, the current time and empty metadata.
#[derive(Debug, Clone, Default)]
pub struct BusinessEventBuilder {
    id: Option<Uuid>,
    payload: Option<SharedPayload>,
    action: Option<String>,
    timestamp: Option<OffsetDateTime>,
    metadata: Arc<HashMap<String, String>>,
}

impl BusinessEventBuilder {
    /// A builder pre-populated with every field of `event`.
    pub fn from_event(event: &BusinessEvent) -> Self {
        Self {
            id: Some(event.id),
            payload: Some(Arc::clone(&event.payload)),
            action: Some(event.action.clone()),
            timestamp: Some(event.timestamp),
            metadata: Arc::clone(&event.metadata),
        }
    }

    /// Set the payload.
    pub fn payload<P: Payload>(self, payload: P) -> Self {
        self.shared_payload(Arc::new(payload))
    }

    /// Set an already shared payload.
    pub fn shared_payload(mut self, payload: SharedPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the id.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Replace the id with a freshly generated one.
    pub fn random_id(self) -> Self {
        self.id(Uuid::new_v4())
    }

    /// Set the action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the timestamp to now.
    pub fn timestamp_now(self) -> Self {
        self.timestamp(OffsetDateTime::now_utc())
    }

    /// Replace all metadata.
    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Arc::new(metadata);
        self
    }

    /// Add a single metadata entry, replacing any previous value for `key`.
    pub fn add_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.metadata).insert(key.into(), value.into());
        self
    }

    /// Add several metadata entries.
    pub fn extend_metadata<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Arc::make_mut(&mut self.metadata)
            .extend(entries.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Build the event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MissingPayload`] if no payload was set.
    pub fn build(self) -> Result<BusinessEvent, EventError> {
        let payload = self.payload.ok_or(EventError::MissingPayload)?;
        Ok(BusinessEvent {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            payload,
            action: self.action.unwrap_or_else(|| actions::NONE.to_string()),
            timestamp: self.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let before = OffsetDateTime::now_utc();
        let event = BusinessEvent::with_payload("payload".to_string());
        assert_eq!(event.action(), actions::NONE);
        assert!(event.metadata().is_empty());
        assert!(event.timestamp() >= before);
        assert_eq!(event.payload_as::<String>().map(String::as_str), Some("payload"));
    }

    #[test]
    fn test_build_requires_payload() {
        let result = BusinessEvent::builder().action(actions::CREATE).build();
        assert!(matches!(result, Err(EventError::MissingPayload)));
    }

    #[test]
    fn test_builder_sets_fields() {
        let id = Uuid::new_v4();
        let event = BusinessEvent::builder()
            .payload(42_i64)
            .id(id)
            .action(actions::UPDATE)
            .add_metadata("tenant", "acme")
            .extend_metadata([("region", "eu")])
            .build()
            .unwrap();

        assert_eq!(event.id(), id);
        assert_eq!(event.action(), actions::UPDATE);
        assert_eq!(event.metadata_value("tenant"), Some("acme"));
        assert_eq!(event.metadata_value("region"), Some("eu"));
        assert_eq!(event.payload_as::<i64>(), Some(&42));
    }

    #[test]
    fn test_copy_with_overrides_leaves_original_untouched() {
        let original = BusinessEvent::builder()
            .payload("order".to_string())
            .action(actions::CREATE)
            .add_metadata("k", "v")
            .build()
            .unwrap();

        let derived = original
            .to_builder()
            .action(actions::DELETE)
            .add_metadata("k", "changed")
            .build()
            .unwrap();

        assert_eq!(derived.id(), original.id());
        assert_eq!(derived.action(), actions::DELETE);
        assert_eq!(derived.metadata_value("k"), Some("changed"));
        assert_eq!(original.action(), actions::CREATE);
        assert_eq!(original.metadata_value("k"), Some("v"));
        assert!(Arc::ptr_eq(original.shared_payload(), derived.shared_payload()));
    }

    #[test]
    fn test_random_id_differs() {
        let original = BusinessEvent::with_payload(1_u8);
        let copy = original.to_builder().random_id().build().unwrap();
        assert_ne!(original.id(), copy.id());
    }
}
