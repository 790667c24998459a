use constitute::{
    Arguments, Constitute, Container, ContainerObserver, Declaration, DiError, DiResult, Key,
    MetricsObserver, TracingObserver,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl ContainerObserver for Recorder {
    fn resolving(&self, key: &Key) {
        self.events.lock().push(format!("resolving {}", key));
    }

    fn resolved(&self, key: &Key, _duration: Duration) {
        self.events.lock().push(format!("resolved {}", key));
    }

    fn failed(&self, key: &Key, error: &DiError) {
        self.events.lock().push(format!("failed {}: {}", key, error));
    }
}

struct Leaf;
impl Constitute for Leaf {
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(Leaf)
    }
}

struct Root;
impl Constitute for Root {
    fn constitute() -> Option<Declaration> {
        Some(Declaration::constituents([Key::named("leaf")]))
    }
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(Root)
    }
}

#[test]
fn test_nested_resolutions_are_reported_in_order() {
    let recorder = Arc::new(Recorder::default());
    let container = Container::new();
    container
        .add_observer(recorder.clone())
        .bind_alias(Key::named("leaf"), Key::named("real"), None)
        .bind_value(Key::named("real"), 1u8);

    container.constitute(&Key::named("leaf")).unwrap();
    assert_eq!(
        recorder.events(),
        vec!["resolving leaf", "resolving real", "resolved real", "resolved leaf"]
    );
}

#[test]
fn test_collection_resolutions_are_reported() {
    let recorder = Arc::new(Recorder::default());
    let container = Container::new();
    container
        .add_observer(recorder.clone())
        .bind_alias(Key::named("plugin"), Key::named("real"), None)
        .bind_value(Key::named("real"), 1u8);

    assert_eq!(container.constitute_all(&Key::named("plugin")).unwrap().len(), 1);
    assert_eq!(
        recorder.events(),
        vec!["resolving plugin", "resolving real", "resolved real", "resolved plugin"]
    );

    assert!(container.constitute_all(&Key::named("none")).unwrap().is_empty());
    assert_eq!(recorder.events().len(), 6);
}

#[test]
fn test_failures_are_reported() {
    let recorder = Arc::new(Recorder::default());
    let container = Container::new();
    container.add_observer(recorder.clone());

    assert!(container.resolve::<Root>().is_err());
    let events = recorder.events();
    assert_eq!(events.last().unwrap(), &format!("failed {}: Cannot constitute a value of type leaf", Key::class::<Root>()));
    assert!(events.contains(&"failed leaf: Cannot constitute a value of type leaf".to_string()));
}

#[test]
fn test_children_inherit_observers() {
    let metrics = Arc::new(MetricsObserver::new());
    let parent = Container::new();
    parent.add_observer(metrics.clone());

    let child = parent.create_child();
    child.resolve::<Leaf>().unwrap();
    child.resolve::<Leaf>().unwrap();

    assert_eq!(metrics.resolution_count(), 2);
    assert_eq!(metrics.failure_count(), 0);
    assert!(metrics.average_resolution_time().is_some());
}

#[test]
fn test_observer_added_to_child_does_not_reach_parent() {
    let metrics = Arc::new(MetricsObserver::new());
    let parent = Container::new();
    let child = parent.create_child();
    child.add_observer(metrics.clone());

    parent.resolve::<Leaf>().unwrap();
    assert_eq!(metrics.resolution_count(), 0);
}

#[test]
fn test_tracing_observer_with_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("constitute=trace")
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let container = Container::new();
        container.add_observer(Arc::new(TracingObserver::with_prefix("test")));
        container.resolve::<Leaf>().unwrap();
        assert!(container.constitute(&Key::named("missing")).is_err());
    });
}
