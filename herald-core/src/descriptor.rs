//! Runtime type descriptors.
//!
//! Listener binding and payload filtering need to answer "can a value of type
//! `A` be handed to something declared as `B`?" at runtime. Rust has no
//! subtyping between structs, so a payload type declares its supertypes
//! explicitly by naming an embedded field as its base. Each [`Supertype`]
//! carries a view that borrows the base out of the derived value.

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// Borrows an embedded base value out of a derived value.
pub type View = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Any>;

/// Runtime identity of a type plus its declared supertypes.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    supertypes: fn() -> Vec<Supertype>,
}

impl TypeDescriptor {
    /// Describes `T` without any supertypes.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::with_supertypes::<T>(Vec::new)
    }

    /// Describes `T` with the supertypes returned by `supertypes`.
    pub fn with_supertypes<T: ?Sized + 'static>(supertypes: fn() -> Vec<Supertype>) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            supertypes,
        }
    }

    /// The universal payload type. Every descriptor is assignable to it.
    pub fn any() -> Self {
        Self {
            id: TypeId::of::<dyn Any + Send + Sync>(),
            name: "any",
            supertypes: Vec::new,
        }
    }

    /// Returns `true` for the universal payload type.
    pub fn is_any(&self) -> bool {
        self.id == TypeId::of::<dyn Any + Send + Sync>()
    }

    /// The fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The [`TypeId`] of the described type.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The directly declared supertypes.
    pub fn supertypes(&self) -> Vec<Supertype> {
        (self.supertypes)()
    }

    /// Returns `true` if a value described by `other` may be used where `self`
    /// is expected.
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        self.is_any()
            || self.id == other.id
            || other
                .supertypes()
                .iter()
                .any(|supertype| self.is_assignable_from(&supertype.descriptor))
    }

    /// Views `value`, an instance of `actual`, as an instance of `self`.
    ///
    /// Walks the supertype views of `actual` until the described type is
    /// reached. Returns `None` if `self` is not assignable from `actual`.
    pub fn view<'a>(&self, value: &'a dyn Any, actual: &TypeDescriptor) -> Option<&'a dyn Any> {
        if self.is_any() || self.id == actual.id {
            return Some(value);
        }
        actual.supertypes().into_iter().find_map(|supertype| {
            let base = (supertype.view)(value)?;
            self.view(base, &supertype.descriptor)
        })
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name).finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A declared supertype together with the view that reaches it.
#[derive(Clone, Copy)]
pub struct Supertype {
    descriptor: TypeDescriptor,
    view: View,
}

impl Supertype {
    /// Declares `T` as a supertype reachable through `view`.
    pub fn new<T: Describe>(view: View) -> Self {
        Self {
            descriptor: T::descriptor(),
            view,
        }
    }

    /// The descriptor of the supertype.
    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }
}

impl fmt::Debug for Supertype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Supertype").field(&self.descriptor).finish()
    }
}

/// Static access to a type's [`TypeDescriptor`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no type descriptor",
    label = "missing `Describe` implementation",
    note = "Derive `Payload` or use `impl_payload!` to describe payload types."
)]
pub trait Describe: 'static {
    /// The descriptor of `Self`.
    fn descriptor() -> TypeDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Base;
    struct Derived {
        base: Base,
    }
    struct Unrelated;

    impl Describe for Base {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<Self>()
        }
    }

    impl Describe for Derived {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::with_supertypes::<Self>(|| {
                vec![Supertype::new::<Base>(|value| {
                    value
                        .downcast_ref::<Derived>()
                        .map(|derived| &derived.base as &dyn Any)
                })]
            })
        }
    }

    #[test]
    fn test_identity_is_assignable() {
        assert!(Base::descriptor().is_assignable_from(&Base::descriptor()));
    }

    #[test]
    fn test_supertype_is_assignable_from_subtype_only() {
        assert!(Base::descriptor().is_assignable_from(&Derived::descriptor()));
        assert!(!Derived::descriptor().is_assignable_from(&Base::descriptor()));
        assert!(!Base::descriptor().is_assignable_from(&TypeDescriptor::of::<Unrelated>()));
    }

    #[test]
    fn test_any_accepts_everything() {
        let any = TypeDescriptor::any();
        assert!(any.is_any());
        assert!(any.is_assignable_from(&Derived::descriptor()));
        assert!(!Base::descriptor().is_assignable_from(&any));
    }

    #[test]
    fn test_view_reaches_embedded_base() {
        let derived = Derived { base: Base };
        let viewed = Base::descriptor()
            .view(&derived, &Derived::descriptor())
            .and_then(|value| value.downcast_ref::<Base>());
        assert!(std::ptr::eq(viewed.unwrap(), &derived.base));
    }

    #[test]
    fn test_view_fails_for_unrelated_type() {
        let derived = Derived { base: Base };
        let viewed = TypeDescriptor::of::<Unrelated>().view(&derived, &Derived::descriptor());
        assert!(viewed.is_none());
    }
}
