//! Resolution depth guard.
//!
//! Cycles between eager constituents are not detected as cycles; they recurse
//! until the depth limit turns them into [`DiError::DepthExceeded`].

use std::cell::Cell;

use crate::error::{DiError, DiResult};

// Nesting of `Container::constitute` calls on the current thread
thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Guard for one level of resolution nesting. Dropping it leaves the level.
pub(crate) struct DepthGuard {
    _private: (),
}

impl DepthGuard {
    pub(crate) fn enter(max_depth: usize) -> DiResult<Self> {
        DEPTH.with(|depth| {
            let current = depth.get();
            if current >= max_depth {
                return Err(DiError::DepthExceeded(max_depth));
            }
            depth.set(current + 1);
            Ok(Self { _private: () })
        })
    }

    #[cfg(test)]
    pub(crate) fn current() -> usize {
        DEPTH.with(Cell::get)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
