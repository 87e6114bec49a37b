//! Parameter-to-role binding.
//!
//! Each declared parameter position receives exactly one [`Role`]. The rules
//! are tried in a fixed order and the first rule accepting a position wins:
//!
//! 1. [`Role::Event`]: the parameter is exactly [`BusinessEvent`]
//! 2. [`Role::Payload`]: the parameter is assignable from the desired payload
//!    type
//! 3. [`Role::Action`]: the parameter is exactly `String`
//!
//! A role may be bound to several positions. A position no rule accepts makes
//! the whole method unbindable.

use herald_core::{
    Argument, BusinessEvent, Describe, ListenerError, Role, TypeDescriptor, UnboundParameter,
};

type Rule = fn(parameter: &TypeDescriptor, desired_payload: &TypeDescriptor) -> bool;

const RULES: [(Role, Rule); 3] = [
    (Role::Event, is_event),
    (Role::Payload, is_payload),
    (Role::Action, is_action),
];

fn is_event(parameter: &TypeDescriptor, _: &TypeDescriptor) -> bool {
    *parameter == BusinessEvent::descriptor()
}

fn is_payload(parameter: &TypeDescriptor, desired_payload: &TypeDescriptor) -> bool {
    parameter.is_assignable_from(desired_payload)
}

fn is_action(parameter: &TypeDescriptor, _: &TypeDescriptor) -> bool {
    *parameter == String::descriptor()
}

/// The role of every parameter position of one listener method.
///
/// Built once at registration and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerBinding {
    roles: Vec<Role>,
}

impl ListenerBinding {
    /// Binds `parameters` for a listener whose desired payload type is
    /// `desired_payload`.
    ///
    /// # Errors
    ///
    /// [`ListenerError::Unbindable`] naming every position no rule accepts.
    pub fn bind(
        method: &str,
        parameters: &[TypeDescriptor],
        desired_payload: &TypeDescriptor,
    ) -> Result<Self, ListenerError> {
        let mut roles: Vec<Option<Role>> = vec![None; parameters.len()];
        for (role, rule) in RULES {
            for (slot, parameter) in roles.iter_mut().zip(parameters) {
                if slot.is_none() && rule(parameter, desired_payload) {
                    *slot = Some(role);
                }
            }
        }

        let unbound: Vec<UnboundParameter> = roles
            .iter()
            .zip(parameters)
            .enumerate()
            .filter(|(_, (role, _))| role.is_none())
            .map(|(position, (_, parameter))| UnboundParameter {
                position,
                type_name: parameter.name(),
            })
            .collect();
        if !unbound.is_empty() {
            return Err(ListenerError::Unbindable {
                method: method.to_string(),
                parameters: unbound,
            });
        }

        Ok(Self {
            roles: roles.into_iter().flatten().collect(),
        })
    }

    /// The roles, one per parameter position.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// The role bound to `position`.
    pub fn role(&self, position: usize) -> Option<Role> {
        self.roles.get(position).copied()
    }

    /// Get the number of bound parameters.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if the method declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The arguments the bound roles supply for `event`, in parameter order.
    pub fn arguments<'e>(&self, event: &'e BusinessEvent) -> Vec<Argument<'e>> {
        self.roles
            .iter()
            .map(|role| Argument::for_role(*role, event))
            .collect()
    }
}
