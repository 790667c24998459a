//! Container options.
//!
//! Options are fixed when a container is created and inherited by its
//! children. They can be built in code, read from environment variables, or
//! (with the `config` feature) deserialized from any serde format.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default resolution depth before [`DiError::DepthExceeded`](crate::DiError::DepthExceeded).
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Environment variable prefix used by [`ContainerOptions::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "CONSTITUTE";

/// Options controlling container behavior.
///
/// # Examples
///
/// ```rust
/// use constitute::{Container, ContainerOptions, DiError, Key};
///
/// let options = ContainerOptions::default().with_implicit_classes(false);
/// let container = Container::with_options(options);
///
/// // Without implicit construction, unbound class keys are configuration errors
/// struct Service;
/// impl constitute::Constitute for Service {
///     fn construct(_: &mut constitute::Arguments) -> constitute::DiResult<Self> {
///         Ok(Service)
///     }
/// }
/// assert!(matches!(
///     container.constitute(&Key::class::<Service>()),
///     Err(DiError::Unconstructible(_))
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Maximum nesting of `constitute` calls on one thread
    pub max_depth: usize,
    /// Whether unbound class keys are constructed from their declaration
    pub implicit_classes: bool,
}

impl ContainerOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_implicit_classes(mut self, implicit_classes: bool) -> Self {
        self.implicit_classes = implicit_classes;
        self
    }

    /// Reads `CONSTITUTE_MAX_DEPTH` and `CONSTITUTE_IMPLICIT_CLASSES`.
    pub fn from_env() -> Self {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Reads `<PREFIX>_MAX_DEPTH` and `<PREFIX>_IMPLICIT_CLASSES`. Missing or
    /// unparsable variables keep their defaults.
    pub fn from_env_with_prefix(prefix: &str) -> Self {
        let mut options = Self::default();
        if let Some(max_depth) = read_env(prefix, "max_depth", |raw| raw.parse::<usize>().ok()) {
            options.max_depth = max_depth;
        }
        if let Some(implicit) = read_env(prefix, "implicit_classes", parse_bool) {
            options.implicit_classes = implicit;
        }
        options
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            implicit_classes: true,
        }
    }
}

fn read_env<T>(prefix: &str, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let env_key = format!("{}_{}", prefix.to_uppercase(), key.to_uppercase());
    let raw = env::var(&env_key).ok()?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(variable = %env_key, value = %raw, "ignoring unparsable container option");
    }
    parsed
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
