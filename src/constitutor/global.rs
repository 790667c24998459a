//! Process-wide instance table backing [`Lifetime::Global`](crate::Lifetime::Global).
//!
//! The table is created on first use and lives until the process exits. It
//! is shared by every container, so a Global binding is constructed at most
//! once per cache key no matter which container asks for it. [`reset`] is the
//! only way to empty it and exists for test isolation.

use once_cell::sync::Lazy;
use tracing::debug;

use super::InstanceCache;

static INSTANCES: Lazy<InstanceCache> = Lazy::new(InstanceCache::new);

pub(crate) fn instances() -> &'static InstanceCache {
    &INSTANCES
}

/// Drops every globally cached instance.
///
/// Intended for tests. Instances already handed out stay alive through
/// their own references; the next resolution builds a new one.
pub fn reset() {
    debug!(cached = INSTANCES.len(), "resetting global instances");
    INSTANCES.clear();
}

/// Number of globally cached instances.
pub fn len() -> usize {
    INSTANCES.len()
}

pub fn is_empty() -> bool {
    len() == 0
}
