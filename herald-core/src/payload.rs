//! Event payloads.
//!
//! A payload is any value an operation returns that becomes the subject of a
//! business event. Payloads are shared behind [`SharedPayload`] and inspected
//! at runtime through their [`TypeDescriptor`].
//!
//! Two container shapes are recognised by the unwrapper chain: single-value
//! containers ([`Payload::as_optional`], answered only by `Option<T>`) and
//! collections ([`Payload::as_collection`], answered by `Vec`, `VecDeque`,
//! `LinkedList`, `HashSet` and `BTreeSet`). Arrays and boxed slices are plain
//! payloads and are never expanded.

use crate::descriptor::{Describe, TypeDescriptor};
use serde_json::Value;
use std::{
    any::Any,
    collections::{BTreeSet, HashSet, LinkedList, VecDeque},
    fmt,
    hash::Hash,
    sync::Arc,
};

/// A payload shared between the events built from it.
pub type SharedPayload = Arc<dyn Payload>;

/// A value that can be carried by a business event.
///
/// Implement it with `#[derive(Payload)]` or [`impl_payload!`](crate::impl_payload).
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Payload",
    label = "missing `Payload` implementation",
    note = "Derive `Payload` or use `impl_payload!`; payloads must be `Debug + Send + Sync + 'static`."
)]
pub trait Payload: Any + Send + Sync + fmt::Debug {
    /// Runtime descriptor of the concrete payload type.
    fn payload_type(&self) -> TypeDescriptor;

    /// Upcast used for downcasting and supertype views.
    fn as_any(&self) -> &dyn Any;

    /// A structural view of the payload, used by action expressions.
    ///
    /// # Errors
    ///
    /// Fails when the payload's `Serialize` impl rejects it, for example a
    /// map with non-string keys.
    fn to_value(&self) -> Result<Value, serde_json::Error>;

    /// `Some(inner)` if this payload is a single-value container.
    fn as_optional(&self) -> Option<Option<SharedPayload>> {
        None
    }

    /// The elements, in iteration order, if this payload is a collection.
    fn as_collection(&self) -> Option<Box<dyn Iterator<Item = SharedPayload> + '_>> {
        None
    }
}

impl dyn Payload {
    /// Returns `true` if the payload can be viewed as a `T`.
    pub fn is<T: Describe>(&self) -> bool {
        T::descriptor().is_assignable_from(&self.payload_type())
    }

    /// Borrows the payload as a `T`, following declared supertypes.
    pub fn downcast_ref<T: Describe>(&self) -> Option<&T> {
        T::descriptor()
            .view(self.as_any(), &self.payload_type())?
            .downcast_ref::<T>()
    }

    /// Name of the concrete payload type.
    pub fn type_name(&self) -> &'static str {
        self.payload_type().name()
    }
}

/// Implements [`Payload`] and [`Describe`] for serializable types.
///
/// ```rust,ignore
/// impl_payload!(Customer, Order);
///
/// // `Employee` embeds a `Person` in its `person` field and is dispatched to
/// // listeners declared for `Person`.
/// impl_payload!(Employee: person => Person);
/// ```
#[macro_export]
macro_rules! impl_payload {
    (@payload $ty:ty) => {
        impl $crate::Payload for $ty {
            fn payload_type(&self) -> $crate::TypeDescriptor {
                <$ty as $crate::Describe>::descriptor()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn to_value(
                &self,
            ) -> ::std::result::Result<
                $crate::__private::serde_json::Value,
                $crate::__private::serde_json::Error,
            > {
                $crate::__private::serde_json::to_value(self)
            }
        }
    };
    ($ty:ty : $($field:ident => $base:ty),+ $(,)?) => {
        impl $crate::Describe for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::with_supertypes::<$ty>(|| {
                    ::std::vec![$(
                        $crate::Supertype::new::<$base>(|value| {
                            value
                                .downcast_ref::<$ty>()
                                .map(|derived| &derived.$field as &dyn ::std::any::Any)
                        })
                    ),+]
                })
            }
        }
        $crate::impl_payload!(@payload $ty);
    };
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Describe for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::of::<$ty>()
            }
        }
        $crate::impl_payload!(@payload $ty);
    )+};
}

impl_payload!(
    String,
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

fn share<T: Payload + Clone>(value: &T) -> SharedPayload {
    Arc::new(value.clone())
}

// ============================================================================
// Containers
// ============================================================================

impl<T: 'static> Describe for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

impl<T: Payload + Clone> Payload for Option<T> {
    fn payload_type(&self) -> TypeDescriptor {
        <Self as Describe>::descriptor()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        self.as_ref().map_or(Ok(Value::Null), Payload::to_value)
    }

    fn as_optional(&self) -> Option<Option<SharedPayload>> {
        Some(self.as_ref().map(share))
    }
}

macro_rules! impl_collection_payload {
    ($($collection:ident $(: $($bound:path),+)?);+ $(;)?) => {$(
        impl<T: 'static> Describe for $collection<T> {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::of::<Self>()
            }
        }

        impl<T: Payload + Clone $($(+ $bound)+)?> Payload for $collection<T> {
            fn payload_type(&self) -> TypeDescriptor {
                <Self as Describe>::descriptor()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn to_value(&self) -> Result<Value, serde_json::Error> {
                self.iter().map(Payload::to_value).collect::<Result<_, _>>().map(Value::Array)
            }

            fn as_collection(&self) -> Option<Box<dyn Iterator<Item = SharedPayload> + '_>> {
                Some(Box::new(self.iter().map(share)))
            }
        }
    )+};
}

impl_collection_payload!(
    Vec;
    VecDeque;
    LinkedList;
    HashSet: Eq, Hash;
    BTreeSet: Ord;
);

// Arrays and boxed slices are payloads but not collections. They always travel
// as a single payload.

impl<T: 'static, const N: usize> Describe for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

impl<T: Payload + Clone, const N: usize> Payload for [T; N] {
    fn payload_type(&self) -> TypeDescriptor {
        <Self as Describe>::descriptor()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        self.iter().map(Payload::to_value).collect::<Result<_, _>>().map(Value::Array)
    }
}

impl<T: 'static> Describe for Box<[T]> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

impl<T: Payload + Clone> Payload for Box<[T]> {
    fn payload_type(&self) -> TypeDescriptor {
        <Self as Describe>::descriptor()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        self.iter().map(Payload::to_value).collect::<Result<_, _>>().map(Value::Array)
    }
}

// ============================================================================
// Return values
// ============================================================================

/// A return value that may be absent.
///
/// Returning `Nullable::null()` from an emitting operation produces no events.
/// Unlike `Option<T>`, a `Nullable` is never itself a payload, so it is not
/// affected by `skip_unwrap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nullable<T>(Option<T>);

impl<T> Nullable<T> {
    /// An absent value.
    pub fn null() -> Self {
        Self(None)
    }

    /// A present value.
    pub fn of(value: T) -> Self {
        Self(Some(value))
    }

    /// Returns `true` if no value is present.
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the value if present.
    pub fn as_ref(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Unwraps into a plain `Option`.
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

/// Converts an intercepted operation's return value into a payload.
///
/// `None` stands for a null return and results in no events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be emitted as a business event payload",
    label = "missing `ReturnValue` implementation",
    note = "Return a `Payload`, a `SharedPayload` or a `Nullable<T>` from emitting operations."
)]
pub trait ReturnValue: 'static {
    /// The payload carried by this return value.
    fn to_payload(&self) -> Option<SharedPayload>;
}

impl<T: Payload + Clone> ReturnValue for T {
    fn to_payload(&self) -> Option<SharedPayload> {
        Some(share(self))
    }
}

impl ReturnValue for SharedPayload {
    fn to_payload(&self) -> Option<SharedPayload> {
        Some(Arc::clone(self))
    }
}

impl<T: Payload + Clone> ReturnValue for Nullable<T> {
    fn to_payload(&self) -> Option<SharedPayload> {
        self.0.as_ref().map(share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Supertype;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct Person {
        name: String,
    }

    #[derive(Debug, Clone, Serialize)]
    struct Employee {
        person: Person,
        team: String,
    }

    impl_payload!(Person);
    impl_payload!(Employee: person => Person);

    fn employee() -> SharedPayload {
        Arc::new(Employee {
            person: Person {
                name: "Ada".to_string(),
            },
            team: "core".to_string(),
        })
    }

    #[test]
    fn test_downcast_exact_type() {
        let payload: SharedPayload = Arc::new("hello".to_string());
        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("hello"));
        assert!(payload.downcast_ref::<i32>().is_none());
    }

    #[test]
    fn test_downcast_through_supertype() {
        let payload = employee();
        assert!(payload.is::<Person>());
        assert_eq!(payload.downcast_ref::<Person>().unwrap().name, "Ada");
        assert_eq!(payload.downcast_ref::<Employee>().unwrap().team, "core");
    }

    #[test]
    fn test_declared_supertypes() {
        let supertypes: Vec<_> = Employee::descriptor()
            .supertypes()
            .iter()
            .map(Supertype::descriptor)
            .collect();
        assert_eq!(supertypes, vec![Person::descriptor()]);
    }

    #[test]
    fn test_to_value_serializes_struct() {
        let value = employee().to_value().unwrap();
        assert_eq!(value["person"]["name"], "Ada");
        assert_eq!(value["team"], "core");
    }

    #[test]
    fn test_to_value_reports_serialization_failure() {
        #[derive(Debug, Clone, Serialize)]
        struct Grid {
            cells: std::collections::HashMap<(u8, u8), u8>,
        }
        impl_payload!(Grid);

        let grid = Grid {
            cells: [((0, 0), 1)].into_iter().collect(),
        };
        assert!(grid.to_value().is_err());
        assert!(vec![grid.clone()].to_value().is_err());
        assert!(Some(grid).to_value().is_err());
        assert_eq!(None::<Grid>.to_value().unwrap(), Value::Null);
    }

    #[test]
    fn test_option_is_single_value_container() {
        let present = Some(5_i32);
        let inner = present.as_optional().unwrap().unwrap();
        assert_eq!(inner.downcast_ref::<i32>(), Some(&5));

        let absent: Option<i32> = None;
        assert!(absent.as_optional().unwrap().is_none());
        assert!(absent.as_collection().is_none());
    }

    #[test]
    fn test_vec_preserves_order() {
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let elements: Vec<String> = items
            .as_collection()
            .unwrap()
            .map(|element| element.downcast_ref::<String>().unwrap().clone())
            .collect();
        assert_eq!(elements, items);
    }

    #[test]
    fn test_sets_are_collections() {
        let set: HashSet<u8> = [1, 2, 3].into_iter().collect();
        assert_eq!(set.as_collection().unwrap().count(), 3);

        let ordered: BTreeSet<u8> = [3, 1, 2].into_iter().collect();
        let elements: Vec<u8> = ordered
            .as_collection()
            .unwrap()
            .map(|element| *element.downcast_ref::<u8>().unwrap())
            .collect();
        assert_eq!(elements, vec![1, 2, 3]);
    }

    #[test]
    fn test_arrays_and_slices_are_not_containers() {
        let array = [1_u8, 2, 3];
        assert!(array.as_collection().is_none());
        assert!(array.as_optional().is_none());

        let slice: Box<[u8]> = vec![1, 2].into_boxed_slice();
        assert!(slice.as_collection().is_none());
        assert_eq!(slice.to_value().unwrap(), serde_json::json!([1, 2]));
    }

    #[test]
    fn test_return_values() {
        assert!(Nullable::<String>::null().to_payload().is_none());
        let payload = Nullable::of(7_u32).to_payload().unwrap();
        assert_eq!(payload.downcast_ref::<u32>(), Some(&7));

        let absent: Option<u32> = None;
        let payload = absent.to_payload().unwrap();
        assert!(payload.as_optional().unwrap().is_none());
    }
}
