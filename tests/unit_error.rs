//! Error reporting: messages, configuration errors raised at the offending
//! call, and the depth guard.

use constitute::{
    Arguments, Class, Constitute, Container, ContainerOptions, Declaration, DiError, DiResult,
    Factory, Instance, Key, ANONYMOUS,
};
use std::any::TypeId;
use std::error::Error;

struct A;
impl Constitute for A {
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(A)
    }
}

#[test]
fn test_bind_custom_rejects_non_factory() {
    let container = Container::new();
    let err = container.bind_custom(Key::class::<A>(), A).unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("expects a Factory"));
    assert!(err.to_string().ends_with("A"));
    assert!(!container.is_bound(&Key::class::<A>()));
}

#[test]
fn test_bind_custom_accepts_factories() {
    let container = Container::new();
    container
        .bind_custom(Key::named("plain"), Factory::value(Instance::new(1u8)))
        .unwrap()
        .bind_custom(Key::named("shared"), std::sync::Arc::new(Factory::null()))
        .unwrap();

    assert_eq!(*container.get::<u8>(&Key::named("plain")).unwrap(), 1);
    assert!(container.constitute(&Key::named("shared")).unwrap().is_null());
}

#[test]
fn test_error_display_not_a_factory() {
    let error = DiError::NotAFactory("basics::A");
    assert_eq!(
        error.to_string(),
        "Container::bind_custom expects a Factory object, got basics::A"
    );
}

#[test]
fn test_error_display_invalid_declaration() {
    let error = DiError::InvalidDeclaration { class: "Repo", found: "u32" };
    assert_eq!(
        error.to_string(),
        "The constitute declaration of class Repo returned an invalid value of type u32 \
         (should have been a list of constituents or a constitutor)"
    );
}

#[test]
fn test_error_display_unconstructible() {
    let error = DiError::Unconstructible("database.url");
    assert_eq!(error.to_string(), "Cannot constitute a value of type database.url");
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("alloc::string::String");
    assert_eq!(error.to_string(), "Type mismatch for: alloc::string::String");
}

#[test]
fn test_error_display_arguments() {
    let missing = DiError::MissingArgument { owner: "Repo", index: 2 };
    assert_eq!(missing.to_string(), "Missing argument 2 for Repo");

    let unexpected = DiError::UnexpectedArgument { owner: "Repo", index: 0, expected: "a lazy" };
    assert_eq!(unexpected.to_string(), "Argument 0 for Repo is not a lazy dependency");
}

#[test]
fn test_error_display_depth_exceeded() {
    let error = DiError::DepthExceeded(100);
    assert_eq!(error.to_string(), "Max depth 100 exceeded");
    assert!(!error.is_configuration());
}

#[test]
fn test_error_trait_object() {
    let error: Box<dyn Error> = Box::new(DiError::ContainerDropped("pool"));
    assert_eq!(
        error.to_string(),
        "Container dropped before lazy dependency pool was resolved"
    );
    assert!(error.source().is_none());
}

struct Label;

struct Broken;
impl Constitute for Broken {
    fn constitute() -> Option<Declaration> {
        Some(Declaration::dynamic(Label))
    }
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(Broken)
    }
}

#[test]
fn test_invalid_declaration_on_bind() {
    let container = Container::new();
    let err = container
        .bind_class(Key::named("broken"), Class::of::<Broken>(), None)
        .unwrap_err();

    assert!(err.is_configuration());
    let message = err.to_string();
    assert!(message.contains("Broken"));
    assert!(message.contains("Label"));
    assert!(!container.is_bound(&Key::named("broken")));
}

#[test]
fn test_invalid_declaration_on_implicit_construction() {
    let container = Container::new();
    assert!(matches!(
        container.resolve::<Broken>(),
        Err(DiError::InvalidDeclaration { .. })
    ));
}

#[test]
fn test_invalid_declaration_of_anonymous_class() {
    let class = Class::custom(
        TypeId::of::<Label>(),
        None,
        || Some(Declaration::dynamic(3.5f64)),
        |_| Ok(Instance::null()),
    );
    let container = Container::new();
    let err = container.bind_class(Key::named("anon"), class, None).unwrap_err();
    assert_eq!(err, DiError::InvalidDeclaration { class: ANONYMOUS, found: "f64" });
    assert!(err.to_string().contains("[anonymous]"));
}

#[test]
fn test_unbound_named_key_is_unconstructible() {
    let container = Container::new();
    let err = container.constitute(&Key::named("nothing")).unwrap_err();
    assert_eq!(err, DiError::Unconstructible("nothing"));
    assert!(err.is_configuration());
    assert!(container.cached_instance(&Key::named("nothing")).is_none());
}

#[test]
fn test_implicit_classes_can_be_disabled() {
    let container = Container::with_options(ContainerOptions::default().with_implicit_classes(false));
    assert!(matches!(
        container.resolve::<A>(),
        Err(DiError::Unconstructible(_))
    ));

    container.bind_class(Key::class::<A>(), Class::of::<A>(), None).unwrap();
    assert!(container.resolve::<A>().is_ok());
}

#[derive(Debug)]
struct Ping;
impl Constitute for Ping {
    fn constitute() -> Option<Declaration> {
        Some(Declaration::constituents([Key::class::<Pong>()]))
    }
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(Ping)
    }
}

struct Pong;
impl Constitute for Pong {
    fn constitute() -> Option<Declaration> {
        Some(Declaration::constituents([Key::class::<Ping>()]))
    }
    fn construct(_: &mut Arguments) -> DiResult<Self> {
        Ok(Pong)
    }
}

#[test]
fn test_eager_cycle_exceeds_depth() {
    let container = Container::with_options(ContainerOptions::default().with_max_depth(32));
    assert_eq!(container.resolve::<Ping>().unwrap_err(), DiError::DepthExceeded(32));

    // The guard unwinds fully, so unrelated resolutions still work
    assert!(container.resolve::<A>().is_ok());
    assert!(container.cached_instance(&Key::class::<Ping>()).is_none());
}

#[test]
fn test_downcast_to_wrong_type() {
    let container = Container::new();
    container.bind_value(Key::named("port"), 8080u16);
    assert_eq!(
        container.get::<String>(&Key::named("port")).unwrap_err(),
        DiError::TypeMismatch("alloc::string::String")
    );
}
