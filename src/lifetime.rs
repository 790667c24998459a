//! Lifetime policies applied by constitutors.

/// Lifetimes controlling instance caching behavior
///
/// Every [`Constitutor`](crate::Constitutor) carries one lifetime, which
/// decides where (if anywhere) the instances it builds are cached.
///
/// # Examples
///
/// ```rust
/// use constitute::{Arguments, Constitute, Constitutor, Container, Declaration, DiResult, Key};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Constitute for Clock {
///     fn construct(_: &mut Arguments) -> DiResult<Self> {
///         Ok(Clock)
///     }
/// }
///
/// struct Request {
///     clock: Arc<Clock>,
/// }
/// impl Constitute for Request {
///     fn constitute() -> Option<Declaration> {
///         Some(Constitutor::transient([Key::class::<Clock>()]).into())
///     }
///     fn construct(args: &mut Arguments) -> DiResult<Self> {
///         Ok(Request { clock: args.instance()? })
///     }
/// }
///
/// let container = Container::new();
/// let first = container.resolve::<Request>().unwrap();
/// let second = container.resolve::<Request>().unwrap();
///
/// // Transient: a fresh request each time
/// assert!(!Arc::ptr_eq(&first, &second));
/// // Singleton (the default): one clock per container
/// assert!(Arc::ptr_eq(&first.clock, &second.clock));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// New instance per resolution, never cached
    ///
    /// The constituents are resolved again and the raw builder runs on every
    /// call. No cache is read or written.
    Transient,
    /// Single instance per container
    ///
    /// The instance is stored in the cache of the container that requested
    /// it. A child container requesting the same key builds its own.
    Singleton,
    /// Single instance per process
    ///
    /// The instance is stored in the process-wide table shared by every
    /// container. See [`constitutor::global`](crate::constitutor::global).
    Global,
}

impl Lifetime {
    /// Returns true if instances with this lifetime are cached anywhere.
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}
