//! Settings.
//!
//! Settings are layered with `figment`: built-in defaults, then an optional
//! TOML file, then `HERALD_`-prefixed environment variables where `__`
//! separates nesting levels and `_` stands for `-`:
//!
//! ```toml
//! [emission]
//! expression-cache-capacity = 256
//!
//! [emission.unwrapping.unwrap]
//! collections = false
//! ```
//!
//! is equivalent to `HERALD_EMISSION__EXPRESSION_CACHE_CAPACITY=256` and
//! `HERALD_EMISSION__UNWRAPPING__UNWRAP__COLLECTIONS=false`.

use crate::emission::{ActionResolver, BusinessEventEmitter};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use herald_core::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the environment variables read by [`BusinessEventsSettings::load`].
pub const ENV_PREFIX: &str = "HERALD_";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BusinessEventsSettings {
    /// Master switch. When off, neither emission nor listening is set up.
    pub enabled: bool,
    /// Emission side.
    pub emission: EmissionSettings,
    /// Listener side.
    pub listen: ListenSettings,
}

impl Default for BusinessEventsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            emission: EmissionSettings::default(),
            listen: ListenSettings::default(),
        }
    }
}

/// Emission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EmissionSettings {
    /// Whether emitting operations publish events.
    pub enabled: bool,
    /// Maximum number of parsed action expressions kept.
    pub expression_cache_capacity: u64,
    /// Interceptor settings.
    pub aspect: AspectSettings,
    /// Unwrapper chain settings.
    pub unwrapping: UnwrappingSettings,
}

impl Default for EmissionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            expression_cache_capacity: ActionResolver::DEFAULT_CACHE_CAPACITY,
            aspect: AspectSettings::default(),
            unwrapping: UnwrappingSettings::default(),
        }
    }
}

/// Interceptor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AspectSettings {
    /// Position among other interceptors. Lower runs outer.
    pub order: i32,
}

impl Default for AspectSettings {
    fn default() -> Self {
        Self {
            order: BusinessEventEmitter::DEFAULT_ORDER,
        }
    }
}

/// Unwrapper chain settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UnwrappingSettings {
    /// When off, every return value is emitted as a single payload.
    pub enabled: bool,
    /// Built-in unwrappers.
    pub unwrap: UnwrapSettings,
}

impl Default for UnwrappingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            unwrap: UnwrapSettings::default(),
        }
    }
}

/// Built-in unwrapper switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UnwrapSettings {
    /// Unwrap `Option` payloads.
    pub optionals: bool,
    /// Unwrap collection payloads.
    pub collections: bool,
}

impl Default for UnwrapSettings {
    fn default() -> Self {
        Self {
            optionals: true,
            collections: true,
        }
    }
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ListenSettings {
    /// Whether listener methods can be registered.
    pub enabled: bool,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl BusinessEventsSettings {
    /// Loads settings from defaults, the TOML file at `path` if given and
    /// present, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::from_figment(Self::figment(path))
    }

    /// The layered sources [`load`](Self::load) reads, for callers that want
    /// to merge in their own providers.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .map(|key| key.as_str().replace('_', "-").into()),
        )
    }

    /// Extracts settings from `figment`.
    pub fn from_figment(figment: Figment) -> Result<Self, SettingsError> {
        figment
            .extract()
            .map_err(|error| SettingsError::Load(Box::new(error)))
    }
}
