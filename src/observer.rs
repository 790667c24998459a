//! Resolution observers.
//!
//! Observers are notified around every `Container::constitute` call. A
//! container without observers skips the notification path entirely,
//! including the timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::DiError;
use crate::key::Key;

/// Hooks for observing resolution events.
///
/// Observers are called around every `constitute` and `constitute_all` on
/// the container, including nested ones. Every method has an empty default so implementors only override what
/// they need. Child containers inherit the observers their parent had when
/// the child was created.
///
/// # Examples
///
/// ```rust
/// use constitute::{Container, ContainerObserver, Key};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl ContainerObserver for Counter {
///     fn resolving(&self, _key: &Key) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let counter = Arc::new(Counter::default());
/// let container = Container::new();
/// container.add_observer(counter.clone());
/// container.bind_value(Key::named("answer"), 42u32);
///
/// container.constitute(&Key::named("answer")).unwrap();
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub trait ContainerObserver: Send + Sync {
    /// Called before a key is resolved.
    fn resolving(&self, _key: &Key) {}

    /// Called after a key resolved successfully.
    fn resolved(&self, _key: &Key, _duration: Duration) {}

    /// Called when resolving a key failed.
    fn failed(&self, _key: &Key, _error: &DiError) {}
}

#[derive(Clone, Default)]
pub(crate) struct Observers {
    list: Vec<Arc<dyn ContainerObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ContainerObserver>) {
        self.list.push(observer);
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.list {
            observer.resolving(key);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.list {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        for observer in &self.list {
            observer.failed(key, error);
        }
    }
}

/// Observer forwarding resolution events to `tracing`.
///
/// Resolutions are logged at trace level with their duration; failures at
/// warn level. The library never installs a subscriber itself.
pub struct TracingObserver {
    prefix: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self { prefix: "constitute".to_string() }
    }

    /// Creates an observer whose events carry a custom `container` field.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerObserver for TracingObserver {
    fn resolving(&self, key: &Key) {
        trace!(container = %self.prefix, key = key.display_name(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        debug!(container = %self.prefix, key = key.display_name(), ?duration, "resolved");
    }

    fn failed(&self, key: &Key, error: &DiError) {
        warn!(container = %self.prefix, key = key.display_name(), %error, "resolution failed");
    }
}

/// Observer that counts resolutions, failures and total resolution time.
///
/// Nested resolutions are counted individually, so constituting a class with
/// two constituents counts three resolutions.
#[derive(Default)]
pub struct MetricsObserver {
    resolution_count: AtomicU64,
    failure_count: AtomicU64,
    total_resolution_time: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_time.load(Ordering::Relaxed))
    }

    /// Average time per successful resolution.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        Some(Duration::from_nanos(
            self.total_resolution_time.load(Ordering::Relaxed) / count,
        ))
    }

    pub fn reset(&self) {
        self.resolution_count.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
        self.total_resolution_time.store(0, Ordering::Relaxed);
    }
}

impl ContainerObserver for MetricsObserver {
    fn resolved(&self, _key: &Key, duration: Duration) {
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_time
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn failed(&self, _key: &Key, _error: &DiError) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_observer_counts() {
        let metrics = MetricsObserver::new();
        assert_eq!(metrics.average_resolution_time(), None);

        metrics.resolved(&Key::named("a"), Duration::from_micros(10));
        metrics.resolved(&Key::named("b"), Duration::from_micros(30));
        metrics.failed(&Key::named("c"), &DiError::Unconstructible("c"));

        assert_eq!(metrics.resolution_count(), 2);
        assert_eq!(metrics.failure_count(), 1);
        assert_eq!(metrics.total_resolution_time(), Duration::from_micros(40));
        assert_eq!(metrics.average_resolution_time(), Some(Duration::from_micros(20)));

        metrics.reset();
        assert_eq!(metrics.resolution_count(), 0);
        assert_eq!(metrics.total_resolution_time(), Duration::ZERO);
    }

    #[test]
    fn test_average_with_count_beyond_u32() {
        let metrics = MetricsObserver::new();
        let count = 1u64 << 32;
        metrics.resolution_count.store(count, Ordering::Relaxed);
        metrics.total_resolution_time.store(count * 3, Ordering::Relaxed);

        assert_eq!(metrics.average_resolution_time(), Some(Duration::from_nanos(3)));
    }

    #[test]
    fn test_observers_fan_out() {
        let first = Arc::new(MetricsObserver::new());
        let second = Arc::new(MetricsObserver::new());
        let mut observers = Observers::default();
        assert!(observers.is_empty());
        observers.add(first.clone());
        observers.add(second.clone());

        observers.resolving(&Key::named("x"));
        observers.resolved(&Key::named("x"), Duration::from_nanos(5));
        assert_eq!(first.resolution_count(), 1);
        assert_eq!(second.resolution_count(), 1);
    }
}
