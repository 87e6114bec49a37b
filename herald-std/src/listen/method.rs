//! Listener methods.
//!
//! A [`ListenerMethod`] is the registration-time description of a method on
//! an owner type: its name, its declared parameter types and, when it is a
//! listener, its [`ListenerConfig`]. It is built from an ordinary Rust
//! function taking `&Owner` followed by up to eight [`ListenerArgument`]s.

use herald_core::{
    Argument, BoxError, Describe, DispatchError, ListenerArgument, ListenerOutcome,
    TypeDescriptor,
};
use std::{
    any::{Any, type_name},
    collections::BTreeSet,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

/// The listener marker: which payload type and actions a listener accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    payload_type: TypeDescriptor,
    actions: BTreeSet<String>,
}

impl ListenerConfig {
    /// Accept every payload and every action.
    pub fn new() -> Self {
        Self {
            payload_type: TypeDescriptor::any(),
            actions: BTreeSet::new(),
        }
    }

    /// Accept payloads assignable to `T`.
    pub fn for_payload<T: Describe>() -> Self {
        Self {
            payload_type: T::descriptor(),
            ..Self::new()
        }
    }

    /// Add an accepted action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.insert(action.into());
        self
    }

    /// Add several accepted actions.
    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// The desired payload type.
    pub fn payload_type(&self) -> TypeDescriptor {
        self.payload_type
    }

    /// The accepted actions. Empty accepts every action.
    pub fn accepted_actions(&self) -> &BTreeSet<String> {
        &self.actions
    }

    /// Returns `true` if `action` passes the action filter.
    pub fn accepts_action(&self, action: &str) -> bool {
        self.actions.is_empty() || self.actions.contains(action)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A function usable as a listener method on `Owner`.
///
/// Implemented for every `Fn(&Owner, A1, .., An) -> R` with up to eight
/// [`ListenerArgument`] parameters and a [`ListenerOutcome`] return type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a listener method on `{Owner}`",
    label = "missing `ListenerFn` implementation",
    note = "Listener methods take `&Owner` followed by up to 8 `ListenerArgument` parameters and return `()` or `Result<(), E>`."
)]
pub trait ListenerFn<Owner, Args>: Send + Sync + 'static {
    /// The declared parameter types, in order, excluding the owner.
    fn parameter_types() -> Vec<TypeDescriptor>;

    /// Calls the function with one argument per declared parameter.
    fn call(&self, owner: &Owner, arguments: &[Argument<'_>]) -> Result<(), BoxError>;
}

macro_rules! impl_listener_fn {
    ($($T:ident),*) => {
        impl<F, Owner, $($T,)* Out> ListenerFn<Owner, ($($T,)*)> for F
        where
            Owner: 'static,
            F: Fn(&Owner, $($T,)*) -> Out + Send + Sync + 'static,
            $($T: ListenerArgument,)*
            Out: ListenerOutcome,
        {
            fn parameter_types() -> Vec<TypeDescriptor> {
                vec![$($T::parameter_type()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn call(&self, owner: &Owner, arguments: &[Argument<'_>]) -> Result<(), BoxError> {
                let mut position = 0;
                $(
                    let argument = arguments
                        .get(position)
                        .copied()
                        .ok_or(DispatchError::MissingArgument(position))?;
                    let $T = $T::from_argument(argument)?;
                    position += 1;
                )*
                self(owner, $($T,)*).into_result()
            }
        }
    };
}

impl_listener_fn!();
impl_listener_fn!(T1);
impl_listener_fn!(T1, T2);
impl_listener_fn!(T1, T2, T3);
impl_listener_fn!(T1, T2, T3, T4);
impl_listener_fn!(T1, T2, T3, T4, T5);
impl_listener_fn!(T1, T2, T3, T4, T5, T6);
impl_listener_fn!(T1, T2, T3, T4, T5, T6, T7);
impl_listener_fn!(T1, T2, T3, T4, T5, T6, T7, T8);

/// Object-safe form of [`ListenerFn`] with the owner type erased.
trait ErasedListenerFn: Send + Sync {
    fn invoke(
        &self,
        owner_name: &str,
        owner: &(dyn Any + Send + Sync),
        arguments: &[Argument<'_>],
    ) -> Result<(), BoxError>;
}

struct Invoker<F, Owner, Args> {
    func: F,
    _marker: PhantomData<fn(&Owner, Args)>,
}

impl<F, Owner, Args> ErasedListenerFn for Invoker<F, Owner, Args>
where
    F: ListenerFn<Owner, Args>,
    Owner: 'static,
    Args: 'static,
{
    fn invoke(
        &self,
        owner_name: &str,
        owner: &(dyn Any + Send + Sync),
        arguments: &[Argument<'_>],
    ) -> Result<(), BoxError> {
        let owner = owner
            .downcast_ref::<Owner>()
            .ok_or_else(|| DispatchError::OwnerType {
                owner: owner_name.to_string(),
                expected: type_name::<Owner>(),
            })?;
        self.func.call(owner, arguments)
    }
}

/// A method declared on an owner type, possibly marked as a listener.
///
/// # Example
///
/// ```rust,ignore
/// let method = ListenerMethod::new("on_order", OrderAudit::on_order)
///     .listener(ListenerConfig::for_payload::<Order>().action(actions::CREATE));
/// ```
#[derive(Clone)]
pub struct ListenerMethod {
    name: String,
    owner_type: &'static str,
    parameters: Vec<TypeDescriptor>,
    config: Option<ListenerConfig>,
    invoker: Arc<dyn ErasedListenerFn>,
}

impl ListenerMethod {
    /// Describes `func`, a method on `Owner` called `name`. The method is not
    /// a listener until [`listener`](Self::listener) marks it.
    pub fn new<Owner, Args, F>(name: impl Into<String>, func: F) -> Self
    where
        Owner: 'static,
        Args: 'static,
        F: ListenerFn<Owner, Args>,
    {
        Self {
            name: name.into(),
            owner_type: type_name::<Owner>(),
            parameters: F::parameter_types(),
            config: None,
            invoker: Arc::new(Invoker {
                func,
                _marker: PhantomData,
            }),
        }
    }

    /// Marks the method as a listener.
    pub fn listener(mut self, config: ListenerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type declaring the method.
    pub fn owner_type(&self) -> &'static str {
        self.owner_type
    }

    /// `Owner::name`, used in messages.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner_type, self.name)
    }

    /// Declared parameter types, in order, excluding the owner.
    pub fn parameter_types(&self) -> &[TypeDescriptor] {
        &self.parameters
    }

    /// The listener marker, if present.
    pub fn config(&self) -> Option<&ListenerConfig> {
        self.config.as_ref()
    }

    /// Returns `true` if the method carries the listener marker.
    pub fn is_listener(&self) -> bool {
        self.config.is_some()
    }

    /// Invokes the method on `owner` with one argument per parameter.
    pub fn invoke(
        &self,
        owner_name: &str,
        owner: &(dyn Any + Send + Sync),
        arguments: &[Argument<'_>],
    ) -> Result<(), BoxError> {
        self.invoker.invoke(owner_name, owner, arguments)
    }
}

impl fmt::Debug for ListenerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerMethod")
            .field("name", &self.name)
            .field("owner_type", &self.owner_type)
            .field("parameters", &self.parameters)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{BusinessEvent, Role, actions};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Journal {
        lines: Mutex<Vec<String>>,
    }

    impl Journal {
        fn write(&self, payload: String, action: String) {
            self.lines.lock().unwrap().push(format!("{action}:{payload}"));
        }

        fn refuse(&self, _event: BusinessEvent) -> Result<(), std::io::Error> {
            Err(std::io::Error::other("journal is read-only"))
        }
    }

    fn event() -> BusinessEvent {
        BusinessEvent::builder()
            .payload("order-1".to_string())
            .action(actions::CREATE)
            .build()
            .unwrap()
    }

    #[test]
    fn test_parameter_types_follow_declaration() {
        let method = ListenerMethod::new("write", Journal::write);
        assert_eq!(
            method.parameter_types(),
            [String::descriptor(), String::descriptor()]
        );
        assert!(method.qualified_name().ends_with("Journal::write"));
        assert!(!method.is_listener());

        let method = method.listener(ListenerConfig::new());
        assert!(method.is_listener());
    }

    #[test]
    fn test_invoke_with_arguments() {
        let journal = Journal::default();
        let event = event();
        let method = ListenerMethod::new("write", Journal::write);
        let arguments = [
            Argument::for_role(Role::Payload, &event),
            Argument::for_role(Role::Action, &event),
        ];
        method.invoke("journal", &journal, &arguments).unwrap();
        assert_eq!(*journal.lines.lock().unwrap(), ["CREATE:order-1"]);
    }

    #[test]
    fn test_listener_error_is_returned_unchanged() {
        let journal = Journal::default();
        let event = event();
        let method = ListenerMethod::new("refuse", Journal::refuse);
        let error = method
            .invoke("journal", &journal, &[Argument::Event(&event)])
            .unwrap_err();
        assert!(error.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_owner_type_mismatch() {
        let method = ListenerMethod::new("write", Journal::write);
        let error = method.invoke("journal", &42_u8, &[]).unwrap_err();
        assert_eq!(
            *error.downcast_ref::<DispatchError>().unwrap(),
            DispatchError::OwnerType {
                owner: "journal".into(),
                expected: type_name::<Journal>(),
            }
        );
    }

    #[test]
    fn test_missing_argument() {
        let journal = Journal::default();
        let event = event();
        let method = ListenerMethod::new("write", Journal::write);
        let error = method
            .invoke("journal", &journal, &[Argument::for_role(Role::Payload, &event)])
            .unwrap_err();
        assert_eq!(
            *error.downcast_ref::<DispatchError>().unwrap(),
            DispatchError::MissingArgument(1)
        );
    }

    #[test]
    fn test_zero_parameter_closure() {
        let method = ListenerMethod::new("ping", |_: &Journal| {});
        assert!(method.parameter_types().is_empty());
        method.invoke("journal", &Journal::default(), &[]).unwrap();
    }

    #[test]
    fn test_config_action_filter() {
        let config = ListenerConfig::for_payload::<String>().actions([actions::CREATE, actions::DELETE]);
        assert!(config.accepts_action(actions::CREATE));
        assert!(!config.accepts_action(actions::UPDATE));
        assert!(ListenerConfig::new().accepts_action("ANYTHING"));
        assert_eq!(config.payload_type(), String::descriptor());
    }
}
