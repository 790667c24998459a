//! Deferred resolution handles.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::container::{Container, ContainerInner};
use crate::error::{DiError, DiResult};
use crate::instance::Instance;
use crate::key::Key;

/// Zero-argument handle that constitutes its key when invoked.
///
/// Nothing is built until [`get`](Lazy::get) is called, which makes lazy
/// constituents the way to wire two classes that need each other. The handle
/// adds no cache of its own: each call goes through the key's binding, so a
/// Singleton target is built once and a Transient target on every call.
///
/// The handle keeps a weak reference to the container that resolved it.
/// Calling it after that container is dropped fails with
/// [`DiError::ContainerDropped`].
#[derive(Clone)]
pub struct Lazy {
    container: Weak<ContainerInner>,
    key: Key,
}

impl Lazy {
    pub(crate) fn new(container: &Container, key: Key) -> Self {
        Self { container: container.downgrade(), key }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Constitutes the key now.
    pub fn get(&self) -> DiResult<Instance> {
        let container = Container::upgrade(&self.container)
            .ok_or(DiError::ContainerDropped(self.key.display_name()))?;
        container.constitute(&self.key)
    }

    /// Constitutes the key now and downcasts the result.
    pub fn get_as<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.get()?.downcast::<T>()
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy").field("key", &self.key).finish()
    }
}
