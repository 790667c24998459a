use constitute::constitutor::global;
use constitute::{
    Arguments, Class, Constitute, Constitutor, Container, Declaration, DiError, DiResult, Instance,
    Key, Lifetime,
};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

struct Shared;
impl Constitute for Shared {
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(Shared)
    }
}

struct PerCall {
    shared: Arc<Shared>,
}
impl Constitute for PerCall {
    fn constitute() -> Option<Declaration> {
        Some(Constitutor::transient([Key::class::<Shared>()]).into())
    }
    fn construct(args: &mut Arguments) -> DiResult<Self> {
        Ok(PerCall { shared: args.instance()? })
    }
}

static GLOBAL_BUILDS: AtomicUsize = AtomicUsize::new(0);

struct Process;
impl Constitute for Process {
    fn constitute() -> Option<Declaration> {
        Some(Constitutor::from(Lifetime::Global).into())
    }
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        GLOBAL_BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(Process)
    }
}

#[test]
fn test_transient_shares_singleton_dependency() {
    let container = Container::new();
    let first = container.resolve::<PerCall>().unwrap();
    let second = container.resolve::<PerCall>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.shared, &second.shared));
}

#[test]
fn test_singleton_is_per_container() {
    let left = Container::new();
    let right = Container::new();

    let a = left.resolve::<Shared>().unwrap();
    let b = right.resolve::<Shared>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &left.resolve::<Shared>().unwrap()));
}

#[test]
#[serial]
fn test_global_is_shared_across_containers() {
    global::reset();
    let before = GLOBAL_BUILDS.load(Ordering::SeqCst);

    let a = Container::new().resolve::<Process>().unwrap();
    let b = Container::new().resolve::<Process>().unwrap();
    let c = Container::new().create_child().resolve::<Process>().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &c));
    assert_eq!(GLOBAL_BUILDS.load(Ordering::SeqCst) - before, 1);
}

#[test]
#[serial]
fn test_global_reset_forces_rebuild() {
    global::reset();
    let first = Container::new().resolve::<Process>().unwrap();
    assert!(!global::is_empty());

    global::reset();
    assert!(global::is_empty());
    let second = Container::new().resolve::<Process>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_transient_never_caches() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();

    let container = Container::new();
    container.bind_method(
        Key::named("ticket"),
        move |_, _| Ok(Instance::new(counter.fetch_add(1, Ordering::SeqCst))),
        Some(Constitutor::from(Lifetime::Transient)),
    );

    for expected in 0..3 {
        assert_eq!(*container.get::<usize>(&Key::named("ticket")).unwrap(), expected);
    }
    assert!(container.cached_instance(&Key::named("ticket")).is_none());
}

#[test]
fn test_failed_construction_caches_nothing() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let container = Container::new();
    container.bind_method(
        Key::named("flaky"),
        move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DiError::Unconstructible("flaky"))
            } else {
                Ok(Instance::new("ready"))
            }
        },
        None,
    );

    assert!(container.constitute(&Key::named("flaky")).is_err());
    assert!(container.cached_instance(&Key::named("flaky")).is_none());

    let value = container.get::<&str>(&Key::named("flaky")).unwrap();
    assert_eq!(*value, "ready");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failed_dependency_caches_nothing() {
    #[derive(Debug)]
    struct NeedsMissing;
    impl Constitute for NeedsMissing {
        fn constitute() -> Option<Declaration> {
            Some(Declaration::constituents([Key::named("missing")]))
        }
        fn construct(_: &mut Arguments) -> DiResult<Self> {
            Ok(NeedsMissing)
        }
    }

    let container = Container::new();
    assert_eq!(
        container.resolve::<NeedsMissing>().unwrap_err(),
        DiError::Unconstructible("missing")
    );
    assert!(container.cached_instance(&Key::class::<NeedsMissing>()).is_none());

    container.bind_value(Key::named("missing"), ());
    assert!(container.resolve::<NeedsMissing>().is_ok());
}

#[test]
fn test_class_cache_is_shared_across_bindings() {
    let container = Container::new();
    container
        .bind_class(Key::named("primary"), Class::of::<Shared>(), None)
        .unwrap()
        .bind_class(Key::named("secondary"), Class::of::<Shared>(), None)
        .unwrap();

    let primary = container.get::<Shared>(&Key::named("primary")).unwrap();
    let secondary = container.get::<Shared>(&Key::named("secondary")).unwrap();
    let direct = container.resolve::<Shared>().unwrap();
    assert!(Arc::ptr_eq(&primary, &secondary));
    assert!(Arc::ptr_eq(&primary, &direct));
}

#[test]
fn test_explicit_constitutor_overrides_declaration() {
    let container = Container::new();
    container
        .bind_class(
            Key::named("fresh"),
            Class::of::<Shared>(),
            Some(Constitutor::from(Lifetime::Transient)),
        )
        .unwrap();

    let a = container.get::<Shared>(&Key::named("fresh")).unwrap();
    let b = container.get::<Shared>(&Key::named("fresh")).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

static SLOW_BUILDS: AtomicUsize = AtomicUsize::new(0);

struct Slow;
impl Constitute for Slow {
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        SLOW_BUILDS.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        Ok(Slow)
    }
}

#[test]
fn test_concurrent_singleton_constructs_once() {
    let container = Container::new();
    let barrier = Barrier::new(8);

    let resolved: Vec<Arc<Slow>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    container.resolve::<Slow>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(SLOW_BUILDS.load(Ordering::SeqCst), 1);
    assert!(resolved.iter().all(|slow| Arc::ptr_eq(slow, &resolved[0])));
}

static SLOW_GLOBAL_BUILDS: AtomicUsize = AtomicUsize::new(0);

struct SlowProcess;
impl Constitute for SlowProcess {
    fn constitute() -> Option<Declaration> {
        Some(Constitutor::from(Lifetime::Global).into())
    }
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        SLOW_GLOBAL_BUILDS.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        Ok(SlowProcess)
    }
}

#[test]
#[serial]
fn test_concurrent_global_constructs_once() {
    global::reset();
    let before = SLOW_GLOBAL_BUILDS.load(Ordering::SeqCst);
    let shared = Container::new();
    let barrier = Barrier::new(8);

    let resolved: Vec<Arc<SlowProcess>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = &shared;
                let barrier = &barrier;
                s.spawn(move || {
                    let container = if i % 2 == 0 { shared.clone() } else { Container::new() };
                    barrier.wait();
                    container.resolve::<SlowProcess>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(SLOW_GLOBAL_BUILDS.load(Ordering::SeqCst) - before, 1);
    assert!(resolved.iter().all(|process| Arc::ptr_eq(process, &resolved[0])));
}
