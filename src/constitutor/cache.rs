//! Instance tables used by the Singleton and Global policies.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, ReentrantMutex};
use tracing::trace;

use super::CacheKey;
use crate::container::{Container, ContainerInner};
use crate::error::DiResult;
use crate::instance::Instance;

// One cached instance plus the lock its builders take. The lock is
// reentrant so an eager cycle on one thread recurses into the depth guard
// instead of blocking on itself.
#[derive(Default)]
struct Cell {
    building: ReentrantMutex<()>,
    value: OnceCell<Instance>,
}

#[derive(Clone)]
enum Slot {
    Cell(Arc<Cell>),
    // A container's own entry; weak so the container does not own itself
    Container(Weak<ContainerInner>),
}

impl Slot {
    fn materialize(&self) -> Option<Instance> {
        match self {
            Slot::Cell(cell) => cell.value.get().cloned(),
            Slot::Container(inner) => Container::upgrade(inner).map(Instance::new),
        }
    }
}

/// Cache of constituted instances keyed by [`CacheKey`].
///
/// Each key is built at most once: concurrent callers for the same key wait
/// for the first builder and share its instance. The table lock is never
/// held while an instance is being built, so builders may recursively
/// resolve other keys through the same cache.
#[derive(Default)]
pub(crate) struct InstanceCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &CacheKey) -> Option<Instance> {
        let slot = self.slots.lock().get(key).cloned();
        slot.and_then(|slot| slot.materialize())
    }

    /// Returns the instance cached for `key`, or runs `build` and caches its
    /// result. A failed build leaves the key empty.
    pub(crate) fn get_or_try_insert<F>(&self, key: CacheKey, build: F) -> DiResult<Instance>
    where
        F: FnOnce() -> DiResult<Instance>,
    {
        let slot = self
            .slots
            .lock()
            .entry(key)
            .or_insert_with(|| Slot::Cell(Arc::default()))
            .clone();

        let cell = match slot {
            Slot::Cell(cell) => cell,
            Slot::Container(inner) => {
                return match Container::upgrade(&inner) {
                    Some(container) => Ok(Instance::new(container)),
                    None => build(),
                }
            }
        };

        if let Some(hit) = cell.value.get() {
            trace!(?key, "cache hit");
            return Ok(hit.clone());
        }

        let _building = cell.building.lock();
        if let Some(hit) = cell.value.get() {
            trace!(?key, "built by another caller");
            return Ok(hit.clone());
        }

        let instance = build()?;
        // A same-thread cycle may have stored an instance while we built
        match cell.value.set(instance.clone()) {
            Ok(()) => Ok(instance),
            Err(_) => Ok(cell.value.get().cloned().unwrap_or(instance)),
        }
    }

    pub(crate) fn register_container(&self, key: CacheKey, container: Weak<ContainerInner>) {
        self.slots.lock().insert(key, Slot::Container(container));
    }

    /// Number of keys holding an instance.
    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.materialize().is_some())
            .count()
    }

    pub(crate) fn clear(&self) {
        let drained = std::mem::take(&mut *self.slots.lock());
        // Instances are dropped after the lock is released
        drop(drained);
    }
}
