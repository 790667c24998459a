//! Constitutors: caching and lifetime policy around raw construction.
//!
//! A [`Constitutor`] pairs a [`Lifetime`] with the declared constituents of a
//! binding. On every instantiation it checks the cache selected by its
//! lifetime, and on a miss resolves the constituents against the requesting
//! container, runs the raw builder and stores the result. Checking and
//! storing are one step per cache key, so concurrent callers never build the
//! same cached instance twice.

mod cache;
pub mod global;

pub(crate) use cache::InstanceCache;

use std::any::TypeId;

use tracing::trace;

use crate::container::Container;
use crate::error::DiResult;
use crate::factory::FactoryId;
use crate::instance::Instance;
use crate::lifetime::Lifetime;
use crate::resolver::{Resolved, Resolver};

/// Identity under which a factory's instances are cached.
///
/// Class factories cache by class, so every binding that constructs the same
/// class shares one cached instance. All other factories cache by their own
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Class(TypeId),
    Factory(FactoryId),
}

/// Lifetime policy plus normalized constituents.
///
/// # Examples
///
/// ```rust
/// use constitute::{Constitutor, Key, Lifetime, Resolver};
///
/// let constitutor = Constitutor::global([
///     Resolver::instance(Key::named("config")),
///     Resolver::lazy(Key::named("pool")),
/// ]);
/// assert_eq!(constitutor.lifetime(), Lifetime::Global);
/// assert_eq!(constitutor.constituents().len(), 2);
///
/// // Bare keys become eager instance resolvers
/// let plain = Constitutor::transient([Key::named("config")]);
/// assert_eq!(plain.constituents()[0], Resolver::Instance(Key::named("config")));
/// ```
#[derive(Debug, Clone)]
pub struct Constitutor {
    lifetime: Lifetime,
    constituents: Vec<Resolver>,
}

impl Constitutor {
    pub fn new<I, R>(lifetime: Lifetime, constituents: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resolver>,
    {
        Self {
            lifetime,
            constituents: constituents.into_iter().map(Into::into).collect(),
        }
    }

    pub fn transient<I, R>(constituents: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resolver>,
    {
        Self::new(Lifetime::Transient, constituents)
    }

    pub fn singleton<I, R>(constituents: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resolver>,
    {
        Self::new(Lifetime::Singleton, constituents)
    }

    pub fn global<I, R>(constituents: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resolver>,
    {
        Self::new(Lifetime::Global, constituents)
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn constituents(&self) -> &[Resolver] {
        &self.constituents
    }

    /// Returns the cached instance for `key`, or builds one.
    ///
    /// `build` receives the constituents resolved against `scope`, in
    /// declared order. For cached lifetimes it runs at most once per cache
    /// key; callers racing on the same key wait for the first build. If
    /// resolution or `build` fails nothing is cached.
    pub fn constitute<F>(&self, scope: &Container, key: &CacheKey, build: F) -> DiResult<Instance>
    where
        F: FnOnce(Vec<Resolved>) -> DiResult<Instance>,
    {
        let cache = match self.lifetime {
            Lifetime::Transient => return build(self.resolve_constituents(scope)?),
            Lifetime::Singleton => scope.instance_cache(),
            Lifetime::Global => global::instances(),
        };

        trace!(?key, lifetime = ?self.lifetime, "cached constitute");
        cache.get_or_try_insert(*key, || build(self.resolve_constituents(scope)?))
    }

    /// Cached instance for `key`, without constructing anything.
    pub fn cached_instance(&self, scope: &Container, key: &CacheKey) -> Option<Instance> {
        match self.lifetime {
            Lifetime::Transient => None,
            Lifetime::Singleton => scope.instance_cache().get(key),
            Lifetime::Global => global::instances().get(key),
        }
    }

    fn resolve_constituents(&self, scope: &Container) -> DiResult<Vec<Resolved>> {
        self.constituents
            .iter()
            .map(|constituent| constituent.resolve(scope))
            .collect()
    }
}

impl From<Lifetime> for Constitutor {
    fn from(lifetime: Lifetime) -> Self {
        Self { lifetime, constituents: Vec::new() }
    }
}
