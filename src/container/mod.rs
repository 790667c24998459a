//! The container: binding tables, factory lookup and instantiation.

mod bindings;

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use self::bindings::Bindings;
use crate::class::{Class, Constitute};
use crate::config::ContainerOptions;
use crate::constitutor::{CacheKey, Constitutor, InstanceCache};
use crate::error::{DiError, DiResult};
use crate::factory::{Factory, FactoryKind};
use crate::instance::Instance;
use crate::internal::DepthGuard;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::observer::{ContainerObserver, Observers};
use crate::resolver::Arguments;

/// Inversion-of-control container.
///
/// A container maps keys to ordered lists of [`Factory`] bindings and builds
/// instances on demand. The most recently bound factory of a key wins;
/// [`constitute_all`](Container::constitute_all) returns every binding. Keys
/// without a binding fall back to the parent container, and unbound class
/// keys are constructed from the class's own dependency declaration.
///
/// Cloning a container is cheap and yields a handle to the same container.
///
/// # Examples
///
/// ```rust
/// use constitute::{Arguments, Constitute, Container, Declaration, DiResult, Key};
/// use std::sync::Arc;
///
/// struct Engine;
/// impl Constitute for Engine {
///     fn construct(_: &mut Arguments) -> DiResult<Self> {
///         Ok(Engine)
///     }
/// }
///
/// struct Car {
///     engine: Arc<Engine>,
/// }
/// impl Constitute for Car {
///     fn constitute() -> Option<Declaration> {
///         Some(Declaration::constituents([Key::class::<Engine>()]))
///     }
///     fn construct(args: &mut Arguments) -> DiResult<Self> {
///         Ok(Car { engine: args.instance()? })
///     }
/// }
///
/// let container = Container::new();
/// let car = container.resolve::<Car>().unwrap();
///
/// // Singleton by default: the same car, with the same engine
/// assert!(Arc::ptr_eq(&car, &container.resolve::<Car>().unwrap()));
/// assert!(Arc::ptr_eq(&car.engine, &container.resolve::<Engine>().unwrap()));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    bindings: RwLock<Bindings>,
    cache: InstanceCache,
    parent: Option<Container>,
    options: ContainerOptions,
    observers: RwLock<Observers>,
}

impl Container {
    /// Creates a root container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Self::from_parts(None, options, Observers::default())
    }

    fn from_parts(parent: Option<Container>, options: ContainerOptions, observers: Observers) -> Self {
        let container = Self {
            inner: Arc::new(ContainerInner {
                bindings: RwLock::new(Bindings::new()),
                cache: InstanceCache::new(),
                parent,
                options,
                observers: RwLock::new(observers),
            }),
        };
        container.register_self();
        container
    }

    // The container is the cached singleton of its own class key, so
    // classes can declare `Key::class::<Container>()` as a constituent. Only
    // the cache slot is registered; no binding is added.
    fn register_self(&self) {
        let class = Class::of::<Container>();
        self.inner
            .cache
            .register_container(CacheKey::Class(class.id()), self.downgrade());
    }

    /// Creates a child container.
    ///
    /// The child sees every binding of its ancestors, and its own bindings
    /// shadow theirs. Singletons are cached per requesting container, so a
    /// child builds its own instances even for bindings it inherits. The
    /// child starts with the parent's options and observers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use constitute::{Container, Key};
    ///
    /// let parent = Container::new();
    /// parent.bind_value(Key::named("env"), "production");
    /// parent.bind_value(Key::named("region"), "eu");
    ///
    /// let child = parent.create_child();
    /// child.bind_value(Key::named("env"), "test");
    ///
    /// assert_eq!(*child.get::<&str>(&Key::named("env")).unwrap(), "test");
    /// assert_eq!(*child.get::<&str>(&Key::named("region")).unwrap(), "eu");
    /// assert_eq!(*parent.get::<&str>(&Key::named("env")).unwrap(), "production");
    /// ```
    pub fn create_child(&self) -> Container {
        let observers = self.inner.observers.read().clone();
        debug!("creating child container");
        Self::from_parts(Some(self.clone()), self.inner.options.clone(), observers)
    }

    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Returns true if both handles refer to the same container.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Adds an observer notified around every resolution on this container.
    ///
    /// Children created afterwards inherit it.
    pub fn add_observer(&self, observer: Arc<dyn ContainerObserver>) -> &Self {
        self.inner.observers.write().add(observer);
        self
    }

    // ----- Binding -----

    /// Binds `key` to the null instance.
    pub fn bind_null(&self, key: impl Into<Key>) -> &Self {
        self.bind(key.into(), Arc::new(Factory::null()))
    }

    /// Binds `key` to a fixed value, shared by every resolution.
    pub fn bind_value<T: Any + Send + Sync>(&self, key: impl Into<Key>, value: T) -> &Self {
        self.bind(key.into(), Arc::new(Factory::value(Instance::new(value))))
    }

    /// Binds `key` to a class.
    ///
    /// The class declaration is validated now, so an invalid declaration is
    /// reported here rather than at the first resolution. An explicit
    /// `constitutor` takes precedence over the declaration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use constitute::{Arguments, Class, Constitute, Container, DiResult, Key};
    ///
    /// struct SmtpMailer;
    /// impl Constitute for SmtpMailer {
    ///     fn construct(_: &mut Arguments) -> DiResult<Self> {
    ///         Ok(SmtpMailer)
    ///     }
    /// }
    ///
    /// struct FakeMailer;
    /// impl Constitute for FakeMailer {
    ///     fn construct(_: &mut Arguments) -> DiResult<Self> {
    ///         Ok(FakeMailer)
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container.bind_class(Key::class::<SmtpMailer>(), Class::of::<FakeMailer>(), None).unwrap();
    ///
    /// assert!(container.constitute(&Key::class::<SmtpMailer>()).unwrap().is::<FakeMailer>());
    /// ```
    pub fn bind_class(
        &self,
        key: impl Into<Key>,
        class: Class,
        constitutor: Option<Constitutor>,
    ) -> DiResult<&Self> {
        let key = key.into();
        let factory = Factory::class(class, constitutor).map_err(|err| {
            warn!(key = key.display_name(), class = class.name(), %err, "rejected class binding");
            err
        })?;
        Ok(self.bind(key, Arc::new(factory)))
    }

    /// Binds `key` to a builder function.
    ///
    /// The builder receives this container and the resolved constituents of
    /// `constitutor`. Without a constitutor the binding is a Singleton with
    /// no constituents.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use constitute::{Container, Instance, Key};
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let builds = Arc::new(AtomicUsize::new(0));
    /// let counter = builds.clone();
    ///
    /// let container = Container::new();
    /// container.bind_method(
    ///     Key::named("pool"),
    ///     move |_, _| {
    ///         counter.fetch_add(1, Ordering::SeqCst);
    ///         Ok(Instance::new(vec![1u8, 2, 3]))
    ///     },
    ///     None,
    /// );
    ///
    /// container.constitute(&Key::named("pool")).unwrap();
    /// container.constitute(&Key::named("pool")).unwrap();
    /// assert_eq!(builds.load(Ordering::SeqCst), 1);
    /// ```
    pub fn bind_method<F>(&self, key: impl Into<Key>, method: F, constitutor: Option<Constitutor>) -> &Self
    where
        F: Fn(&Container, &mut Arguments) -> DiResult<Instance> + Send + Sync + 'static,
    {
        self.bind(key.into(), Arc::new(Factory::method(method, constitutor)))
    }

    /// Binds `key` as an alias of `target`. Chains of aliases are followed
    /// by recursion.
    pub fn bind_alias(
        &self,
        key: impl Into<Key>,
        target: impl Into<Key>,
        constitutor: Option<Constitutor>,
    ) -> &Self {
        self.bind(key.into(), Arc::new(Factory::alias(target, constitutor)))
    }

    /// Binds `key` to a prebuilt factory.
    pub fn bind_factory(&self, key: impl Into<Key>, factory: impl Into<Arc<Factory>>) -> &Self {
        self.bind(key.into(), factory.into())
    }

    /// Binds `key` to a candidate that must turn out to be a factory.
    ///
    /// Accepts a [`Factory`] or an `Arc<Factory>` behind any static type,
    /// which lets hosts forward factories they only hold type-erased. Any
    /// other value is rejected with [`DiError::NotAFactory`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use constitute::{Container, DiError, Factory, Key};
    ///
    /// let container = Container::new();
    /// assert!(container.bind_custom(Key::named("ok"), Factory::null()).is_ok());
    ///
    /// let err = container.bind_custom(Key::named("bad"), 5u32).unwrap_err();
    /// assert_eq!(err, DiError::NotAFactory("u32"));
    /// ```
    pub fn bind_custom<T: Any + Send + Sync>(&self, key: impl Into<Key>, candidate: T) -> DiResult<&Self> {
        let key = key.into();
        let candidate: Box<dyn Any + Send + Sync> = Box::new(candidate);
        let factory = match candidate.downcast::<Factory>() {
            Ok(factory) => Arc::new(*factory),
            Err(candidate) => match candidate.downcast::<Arc<Factory>>() {
                Ok(factory) => *factory,
                Err(_) => {
                    let err = DiError::NotAFactory(type_name::<T>());
                    warn!(key = key.display_name(), %err, "rejected custom binding");
                    return Err(err);
                }
            },
        };
        Ok(self.bind(key, factory))
    }

    fn bind(&self, key: Key, factory: Arc<Factory>) -> &Self {
        debug!(
            key = key.display_name(),
            kind = factory.kind().name(),
            lifetime = ?factory.constitutor().lifetime(),
            "binding"
        );
        self.inner.bindings.write().insert(key, factory);
        self
    }

    // ----- Lookup -----

    /// Returns true if `key` is bound here or in an ancestor.
    pub fn is_bound(&self, key: &Key) -> bool {
        self.inner.bindings.read().contains(key)
            || self.parent().is_some_and(|parent| parent.is_bound(key))
    }

    /// The most recently bound factory for `key`, searching ancestors when
    /// this container has none.
    pub fn find_best_factory(&self, key: &Key) -> Option<Arc<Factory>> {
        let own = self.inner.bindings.read().most_recent(key);
        own.or_else(|| self.parent().and_then(|parent| parent.find_best_factory(key)))
    }

    /// Every factory bound for `key`: ancestors' first, then this
    /// container's, each in insertion order.
    pub fn find_all_factories(&self, key: &Key) -> Vec<Arc<Factory>> {
        let mut factories = match self.parent() {
            Some(parent) => parent.find_all_factories(key),
            None => Vec::new(),
        };
        factories.extend(self.inner.bindings.read().all(key));
        factories
    }

    /// The factory that [`constitute`](Container::constitute) would use.
    ///
    /// A factory key is its own factory. Unbound class keys get a fresh
    /// class factory when implicit classes are enabled. The container's own
    /// class key always resolves, to a Singleton served from its self slot.
    pub fn resolve_factory(&self, key: &Key) -> DiResult<Arc<Factory>> {
        if let Key::Factory(factory) = key {
            return Ok(Arc::clone(factory));
        }
        if let Some(factory) = self.find_best_factory(key) {
            return Ok(factory);
        }
        match key {
            Key::Class(class) if class.id() == TypeId::of::<Container>() => {
                trace!("self class factory");
                let factory = Factory::new(FactoryKind::Class(*class), Lifetime::Singleton.into());
                Ok(Arc::new(factory))
            }
            Key::Class(class) if self.inner.options.implicit_classes => {
                trace!(class = class.name(), "implicit class factory");
                Factory::class(*class, None).map(Arc::new)
            }
            _ => {
                let err = DiError::Unconstructible(key.display_name());
                warn!(key = key.display_name(), %err, "no binding");
                Err(err)
            }
        }
    }

    // ----- Resolution -----

    /// Builds or fetches the instance for `key`.
    pub fn constitute(&self, key: &Key) -> DiResult<Instance> {
        let _depth = DepthGuard::enter(self.inner.options.max_depth)?;
        self.observed(key, || {
            trace!(key = key.display_name(), "constitute");
            self.resolve_factory(key)?.instantiate(self)
        })
    }

    /// Instances of every binding of `key`, in
    /// [`find_all_factories`](Container::find_all_factories) order. Empty
    /// when nothing is bound.
    pub fn constitute_all(&self, key: &Key) -> DiResult<Vec<Instance>> {
        let _depth = DepthGuard::enter(self.inner.options.max_depth)?;
        self.observed(key, || {
            trace!(key = key.display_name(), "constitute all");
            self.find_all_factories(key)
                .iter()
                .map(|factory| factory.instantiate(self))
                .collect()
        })
    }

    // Runs `resolve` between the observers' `resolving` and
    // `resolved`/`failed` calls.
    fn observed<T>(&self, key: &Key, resolve: impl FnOnce() -> DiResult<T>) -> DiResult<T> {
        let observers = {
            let observers = self.inner.observers.read();
            (!observers.is_empty()).then(|| observers.clone())
        };
        let Some(observers) = observers else {
            return resolve();
        };

        let start = Instant::now();
        observers.resolving(key);
        let result = resolve();
        match &result {
            Ok(_) => observers.resolved(key, start.elapsed()),
            Err(err) => observers.failed(key, err),
        }
        result
    }

    /// The instance already cached for `key`, if any. Never constructs.
    pub fn cached_instance(&self, key: &Key) -> Option<Instance> {
        self.resolve_factory(key).ok()?.cached_instance(self)
    }

    /// Constitutes `key` and downcasts the result.
    pub fn get<T: Any + Send + Sync>(&self, key: &Key) -> DiResult<Arc<T>> {
        self.constitute(key)?.downcast::<T>()
    }

    /// Constitutes every binding of `key` and downcasts the results.
    pub fn get_all<T: Any + Send + Sync>(&self, key: &Key) -> DiResult<Vec<Arc<T>>> {
        self.constitute_all(key)?
            .iter()
            .map(Instance::downcast::<T>)
            .collect()
    }

    /// Constitutes the class key of `T`.
    pub fn resolve<T: Constitute>(&self) -> DiResult<Arc<T>> {
        self.get::<T>(&Key::class::<T>())
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Bindings:\n");
        for (key, factories) in self.inner.bindings.read().iter() {
            for (index, factory) in factories.iter().enumerate() {
                s.push_str(&format!(
                    "  {} @ {}: {} {:?}\n",
                    key.display_name(),
                    index,
                    factory.kind().name(),
                    factory.constitutor().lifetime()
                ));
            }
        }
        s.push_str(&format!("Cached instances: {}\n", self.inner.cache.len()));
        s.push_str(&format!("Has parent: {}\n", self.inner.parent.is_some()));
        s
    }

    // ----- Crate internals -----

    pub(crate) fn instance_cache(&self) -> &InstanceCache {
        &self.inner.cache
    }

    pub(crate) fn downgrade(&self) -> Weak<ContainerInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<ContainerInner>) -> Option<Container> {
        inner.upgrade().map(|inner| Container { inner })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.inner.bindings.read().len())
            .field("cached", &self.inner.cache.len())
            .field("has_parent", &self.inner.parent.is_some())
            .field("options", &self.inner.options)
            .finish()
    }
}

// Resolving the container's own class key yields the container itself
// through its self-registered cache slot. Construction only runs when that
// slot is unavailable.
impl Constitute for Container {
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(Container::new())
    }
}
