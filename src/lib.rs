//! # constitute
//!
//! An inversion-of-control container that builds object graphs from
//! dependency declarations, applying a lifetime policy per binding.
//!
//! ## Features
//!
//! - **Declared dependencies**: types list their constituents through the
//!   [`Constitute`] trait and are built recursively
//! - **Lifetimes**: Transient, Singleton (per container) and Global (per process)
//! - **Flexible bindings**: null, value, class, method and alias factories,
//!   with the most recent binding winning
//! - **Resolvers**: eager instances, collections of every binding, lazy
//!   handles and optional cached lookups
//! - **Hierarchies**: child containers that inherit and shadow bindings
//!
//! ## Quick Start
//!
//! ```rust
//! use constitute::{Arguments, Constitute, Container, Declaration, DiResult, Key};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//! impl Constitute for Database {
//!     fn constitute() -> Option<Declaration> {
//!         Some(Declaration::constituents([Key::named("database.url")]))
//!     }
//!     fn construct(args: &mut Arguments) -> DiResult<Self> {
//!         let url = args.instance::<String>()?;
//!         Ok(Database { url: url.as_ref().clone() })
//!     }
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//! impl Constitute for UserService {
//!     fn constitute() -> Option<Declaration> {
//!         Some(Declaration::constituents([Key::class::<Database>()]))
//!     }
//!     fn construct(args: &mut Arguments) -> DiResult<Self> {
//!         Ok(UserService { db: args.instance()? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.bind_value(Key::named("database.url"), "postgres://localhost".to_string());
//!
//! let users = container.resolve::<UserService>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Transient**: built fresh on every resolution
//! - **Singleton**: built once per requesting container (the default for classes)
//! - **Global**: built once per process and shared by every container
//!
//! ## Trait Objects
//!
//! ```rust
//! use constitute::{Container, Factory, Instance, Key};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! let container = Container::new();
//! let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger);
//! container.bind_factory(Key::of::<dyn Logger>(), Factory::value(Instance::shared(logger)));
//!
//! let logger = container
//!     .constitute(&Key::of::<dyn Logger>())
//!     .and_then(|instance| instance.downcast_shared::<dyn Logger>())
//!     .unwrap();
//! assert_eq!(logger.log("hello"), "[LOG] hello");
//! ```
//!
//! ## Cycles
//!
//! Two classes that need each other cannot both take the other eagerly:
//! eager cycles recurse until the container's depth limit reports
//! [`DiError::DepthExceeded`]. Declare one side with [`Resolver::lazy`] (or
//! [`Resolver::optional`]) to break the cycle.

pub mod class;
pub mod config;
pub mod constitutor;
pub mod container;
pub mod error;
pub mod factory;
pub mod instance;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod resolver;

mod internal;

use std::sync::Arc;

pub use class::{Class, Constitute, Declaration, ANONYMOUS};
pub use config::{ContainerOptions, DEFAULT_MAX_DEPTH};
pub use constitutor::{CacheKey, Constitutor};
pub use container::Container;
pub use error::{DiError, DiResult};
pub use factory::{Factory, FactoryId, FactoryKind, Method};
pub use instance::{AnyArc, Instance};
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{ContainerObserver, MetricsObserver, TracingObserver};
pub use resolver::{Arguments, Lazy, Resolved, Resolver};

/// Builds `T` in a fresh root container.
///
/// # Examples
///
/// ```rust
/// use constitute::{Arguments, Constitute, DiResult};
///
/// struct Greeting(&'static str);
/// impl Constitute for Greeting {
///     fn construct(_: &mut Arguments) -> DiResult<Self> {
///         Ok(Greeting("hello"))
///     }
/// }
///
/// let greeting = constitute::constitute::<Greeting>().unwrap();
/// assert_eq!(greeting.0, "hello");
/// ```
pub fn constitute<T: Constitute>() -> DiResult<Arc<T>> {
    Container::new().resolve::<T>()
}
