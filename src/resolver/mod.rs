//! Resolvers: how one declared dependency becomes a constructor argument.
//!
//! A constitutor holds one [`Resolver`] per constituent and runs them against
//! the requesting container before invoking its raw builder. A bare [`Key`]
//! converts into the eager [`Resolver::Instance`] variant.

mod arguments;
mod lazy;

pub use arguments::Arguments;
pub use lazy::Lazy;

use crate::class::Class;
use crate::container::Container;
use crate::error::DiResult;
use crate::instance::Instance;
use crate::key::Key;

/// Strategy for resolving one constituent.
///
/// # Examples
///
/// ```rust
/// use constitute::{Container, Key, Resolved, Resolver};
///
/// let container = Container::new();
/// container.bind_value(Key::named("plugin"), "first");
/// container.bind_value(Key::named("plugin"), "second");
///
/// match Resolver::all(Key::named("plugin")).resolve(&container).unwrap() {
///     Resolved::All(plugins) => assert_eq!(plugins.len(), 2),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolver {
    /// Eager recursive build via `Container::constitute`
    Instance(Key),
    /// Every binding of the key, in order (possibly empty)
    All(Key),
    /// Deferred build through a [`Lazy`] handle
    Lazy(Key),
    /// The already cached instance, or nothing; never constructs
    Optional(Key),
}

/// A resolved constituent, passed to builders through [`Arguments`].
#[derive(Debug, Clone)]
pub enum Resolved {
    Instance(Instance),
    All(Vec<Instance>),
    Lazy(Lazy),
    Optional(Option<Instance>),
}

impl Resolver {
    pub fn instance(key: impl Into<Key>) -> Self {
        Resolver::Instance(key.into())
    }

    pub fn all(key: impl Into<Key>) -> Self {
        Resolver::All(key.into())
    }

    pub fn lazy(key: impl Into<Key>) -> Self {
        Resolver::Lazy(key.into())
    }

    pub fn optional(key: impl Into<Key>) -> Self {
        Resolver::Optional(key.into())
    }

    pub fn key(&self) -> &Key {
        match self {
            Resolver::Instance(key)
            | Resolver::All(key)
            | Resolver::Lazy(key)
            | Resolver::Optional(key) => key,
        }
    }

    /// Turns the constituent into an argument value for `container`.
    pub fn resolve(&self, container: &Container) -> DiResult<Resolved> {
        match self {
            Resolver::Instance(key) => container.constitute(key).map(Resolved::Instance),
            Resolver::All(key) => container.constitute_all(key).map(Resolved::All),
            Resolver::Lazy(key) => Ok(Resolved::Lazy(Lazy::new(container, key.clone()))),
            Resolver::Optional(key) => Ok(Resolved::Optional(container.cached_instance(key))),
        }
    }
}

impl From<Key> for Resolver {
    fn from(key: Key) -> Self {
        Resolver::Instance(key)
    }
}

impl From<Class> for Resolver {
    fn from(class: Class) -> Self {
        Resolver::Instance(Key::Class(class))
    }
}
