//! The interception model: what the surrounding runtime tells the emitter
//! about an intercepted call.

use crate::event::actions;
use serde::{Deserialize, Serialize};
use std::{
    any::{Any, TypeId, type_name},
    fmt,
};

/// Declared shape of an intercepted method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSignature {
    declaring_type: String,
    name: String,
    parameter_types: Vec<String>,
    return_type: Option<String>,
}

impl MethodSignature {
    /// A method without parameters that returns nothing.
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types: Vec::new(),
            return_type: None,
        }
    }

    /// Append a parameter type.
    pub fn parameter(mut self, type_name: impl Into<String>) -> Self {
        self.parameter_types.push(type_name.into());
        self
    }

    /// Declare the return type. `()` declares a method that returns nothing.
    pub fn returning<R: ?Sized + 'static>(mut self) -> Self {
        self.return_type = if TypeId::of::<R>() == TypeId::of::<()>() {
            None
        } else {
            Some(type_name::<R>().to_string())
        };
        self
    }

    /// Declare the return type by name.
    pub fn returning_named(mut self, type_name: impl Into<String>) -> Self {
        self.return_type = Some(type_name.into());
        self
    }

    /// The type declaring the method.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter type names, in order.
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    /// Declared return type name, `None` for methods returning nothing.
    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    /// Returns `true` if the method declares a return value.
    pub fn returns_value(&self) -> bool {
        self.return_type.is_some()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}({})",
            self.declaring_type,
            self.name,
            self.parameter_types.join(", ")
        )?;
        if let Some(return_type) = &self.return_type {
            write!(f, " -> {return_type}")?;
        }
        Ok(())
    }
}

/// Per-invocation emission configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitConfig {
    /// Static action, used when no expression yields one.
    pub action: String,
    /// Emit the return value as a single payload, without unwrapping.
    pub skip_unwrap: bool,
    /// Expression computing the action. Blank means none.
    pub action_expression: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            action: actions::NONE.to_string(),
            skip_unwrap: false,
            action_expression: String::new(),
        }
    }
}

impl EmitConfig {
    /// Set the static action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Set the action expression.
    pub fn action_expression(mut self, expression: impl Into<String>) -> Self {
        self.action_expression = expression.into();
        self
    }

    /// Disable unwrapping.
    pub fn skip_unwrap(mut self, skip: bool) -> Self {
        self.skip_unwrap = skip;
        self
    }
}

/// Everything the emitter receives about one intercepted call.
#[derive(Clone, Copy)]
pub struct JoinPoint<'a> {
    source: &'a dyn Any,
    source_type: &'static str,
    signature: &'a MethodSignature,
    config: &'a EmitConfig,
}

impl<'a> JoinPoint<'a> {
    /// A join point for a call made on `source`.
    pub fn new<S: Any>(
        source: &'a S,
        signature: &'a MethodSignature,
        config: &'a EmitConfig,
    ) -> Self {
        Self {
            source,
            source_type: type_name::<S>(),
            signature,
            config,
        }
    }

    /// The instance the intercepted method was called on.
    pub fn source(&self) -> &'a dyn Any {
        self.source
    }

    /// Type name of the emitting source.
    pub fn source_type(&self) -> &'static str {
        self.source_type
    }

    /// The intercepted method's signature.
    pub fn signature(&self) -> &'a MethodSignature {
        self.signature
    }

    /// The emission configuration.
    pub fn config(&self) -> &'a EmitConfig {
        self.config
    }
}

impl fmt::Debug for JoinPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinPoint")
            .field("source_type", &self.source_type)
            .field("signature", &self.signature)
            .field("config", &self.config)
            .finish()
    }
}
