//! Factories: how a binding produces a raw instance.
//!
//! Every [`Factory`] owns exactly one [`Constitutor`]. Instantiating a factory
//! hands the constitutor a raw builder; the constitutor decides whether the
//! builder runs or a cached instance is returned.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::class::Class;
use crate::constitutor::{CacheKey, Constitutor};
use crate::container::Container;
use crate::error::DiResult;
use crate::instance::Instance;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::resolver::{Arguments, Resolved};

/// Builder function of a method binding. It receives the container as call
/// context and the resolved constituents.
pub type Method = Arc<dyn Fn(&Container, &mut Arguments) -> DiResult<Instance> + Send + Sync>;

static NEXT_FACTORY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique factory identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryId(u64);

impl FactoryId {
    fn next() -> Self {
        Self(NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The closed set of factory variants.
#[derive(Clone)]
pub enum FactoryKind {
    /// Explicitly absent binding; builds the null instance
    Null,
    /// Fixed precomputed value
    Value(Instance),
    /// Defers to `container.constitute(target)`
    Alias(Key),
    /// Invokes a class constructor with the resolved constituents
    Class(Class),
    /// Invokes an arbitrary builder function
    Method(Method),
}

impl FactoryKind {
    pub fn name(&self) -> &'static str {
        match self {
            FactoryKind::Null => "null",
            FactoryKind::Value(_) => "value",
            FactoryKind::Alias(_) => "alias",
            FactoryKind::Class(_) => "class",
            FactoryKind::Method(_) => "method",
        }
    }
}

impl fmt::Debug for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryKind::Null => f.write_str("Null"),
            FactoryKind::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FactoryKind::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
            FactoryKind::Class(class) => f.debug_tuple("Class").field(class).finish(),
            FactoryKind::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// Strategy for producing an instance, paired with its lifetime policy.
///
/// Default lifetimes differ per variant: null, value and alias factories are
/// Transient (an alias re-resolves its target every time, and the target's
/// own binding decides about caching), method factories are Singleton, and
/// class factories follow the class declaration.
///
/// # Examples
///
/// ```rust
/// use constitute::{Container, Factory, Key};
///
/// let container = Container::new();
/// let factory = Factory::value(constitute::Instance::new(7u8));
///
/// // Ad-hoc factories can be constituted without binding them
/// let seven = container.get::<u8>(&Key::factory(factory)).unwrap();
/// assert_eq!(*seven, 7);
/// ```
pub struct Factory {
    id: FactoryId,
    kind: FactoryKind,
    constitutor: Constitutor,
}

impl Factory {
    pub fn new(kind: FactoryKind, constitutor: Constitutor) -> Self {
        Self { id: FactoryId::next(), kind, constitutor }
    }

    pub fn null() -> Self {
        Self::new(FactoryKind::Null, Lifetime::Transient.into())
    }

    pub fn value(value: Instance) -> Self {
        Self::new(FactoryKind::Value(value), Lifetime::Transient.into())
    }

    pub fn alias(target: impl Into<Key>, constitutor: Option<Constitutor>) -> Self {
        Self::new(
            FactoryKind::Alias(target.into()),
            constitutor.unwrap_or_else(|| Lifetime::Transient.into()),
        )
    }

    /// Class factory. The class declaration is validated here even when an
    /// explicit constitutor overrides it.
    pub fn class(class: Class, constitutor: Option<Constitutor>) -> DiResult<Self> {
        let declared = class.constitutor()?;
        Ok(Self::new(FactoryKind::Class(class), constitutor.unwrap_or(declared)))
    }

    pub fn method<F>(method: F, constitutor: Option<Constitutor>) -> Self
    where
        F: Fn(&Container, &mut Arguments) -> DiResult<Instance> + Send + Sync + 'static,
    {
        Self::new(
            FactoryKind::Method(Arc::new(method)),
            constitutor.unwrap_or_else(|| Lifetime::Singleton.into()),
        )
    }

    pub fn id(&self) -> FactoryId {
        self.id
    }

    pub fn kind(&self) -> &FactoryKind {
        &self.kind
    }

    pub fn constitutor(&self) -> &Constitutor {
        &self.constitutor
    }

    pub fn cache_key(&self) -> CacheKey {
        match &self.kind {
            FactoryKind::Class(class) => CacheKey::Class(class.id()),
            _ => CacheKey::Factory(self.id),
        }
    }

    /// Produces an instance for `container`, honoring the lifetime policy.
    pub fn instantiate(&self, container: &Container) -> DiResult<Instance> {
        self.constitutor
            .constitute(container, &self.cache_key(), |resolved| self.create_instance(container, resolved))
    }

    /// The instance cached for `container`, if any. Never constructs.
    pub fn cached_instance(&self, container: &Container) -> Option<Instance> {
        self.constitutor.cached_instance(container, &self.cache_key())
    }

    fn create_instance(&self, container: &Container, resolved: Vec<Resolved>) -> DiResult<Instance> {
        match &self.kind {
            FactoryKind::Null => Ok(Instance::null()),
            FactoryKind::Value(value) => Ok(value.clone()),
            FactoryKind::Alias(target) => container.constitute(target),
            FactoryKind::Class(class) => {
                debug!(class = class.name(), "constructing");
                let mut args = Arguments::new(class.name(), resolved);
                class.construct(&mut args)
            }
            FactoryKind::Method(method) => {
                let mut args = Arguments::new("[method]", resolved);
                method(container, &mut args)
            }
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("lifetime", &self.constitutor.lifetime())
            .finish()
    }
}
