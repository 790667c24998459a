//! Error types for the container.

use std::fmt;

/// Container errors
///
/// Represents the conditions that can occur while binding keys, resolving
/// factories or constituting instances.
///
/// Configuration errors ([`NotAFactory`](DiError::NotAFactory),
/// [`InvalidDeclaration`](DiError::InvalidDeclaration) and
/// [`Unconstructible`](DiError::Unconstructible)) are raised synchronously at
/// the offending call. [`DepthExceeded`](DiError::DepthExceeded) marks runaway
/// recursion, which is fatal for the resolution that hit it.
///
/// # Examples
///
/// ```rust
/// use constitute::{Container, DiError, Key};
///
/// let container = Container::new();
/// match container.constitute(&Key::named("missing")) {
///     Err(DiError::Unconstructible(name)) => assert_eq!(name, "missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use constitute::DiError;
///
/// let not_a_factory = DiError::NotAFactory("alloc::string::String");
/// let depth_exceeded = DiError::DepthExceeded(128);
///
/// assert!(not_a_factory.is_configuration());
/// assert!(!depth_exceeded.is_configuration());
/// println!("Error: {}", not_a_factory);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// `bind_custom` was given something that is not a factory
    NotAFactory(&'static str),
    /// A class dependency declaration had an unsupported shape
    InvalidDeclaration {
        /// Class name, or `[anonymous]`
        class: &'static str,
        /// Type name of the value the declaration produced
        found: &'static str,
    },
    /// No binding and no implicit construction for the key
    Unconstructible(&'static str),
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// A null instance was read where a value was required
    NullInstance(&'static str),
    /// A builder read past its declared constituents
    MissingArgument {
        owner: &'static str,
        index: usize,
    },
    /// A builder read a constituent with the wrong resolver shape
    UnexpectedArgument {
        owner: &'static str,
        index: usize,
        expected: &'static str,
    },
    /// A lazy handle was invoked after its container was dropped
    ContainerDropped(&'static str),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
}

impl DiError {
    /// Returns true for errors caused by invalid bindings or class metadata.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DiError::NotAFactory(_) | DiError::InvalidDeclaration { .. } | DiError::Unconstructible(_)
        )
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotAFactory(name) => {
                write!(f, "Container::bind_custom expects a Factory object, got {}", name)
            }
            DiError::InvalidDeclaration { class, found } => write!(
                f,
                "The constitute declaration of class {} returned an invalid value of type {} \
                 (should have been a list of constituents or a constitutor)",
                class, found
            ),
            DiError::Unconstructible(name) => write!(f, "Cannot constitute a value of type {}", name),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::NullInstance(name) => write!(f, "Null instance where {} was expected", name),
            DiError::MissingArgument { owner, index } => {
                write!(f, "Missing argument {} for {}", index, owner)
            }
            DiError::UnexpectedArgument { owner, index, expected } => {
                write!(f, "Argument {} for {} is not {} dependency", index, owner, expected)
            }
            DiError::ContainerDropped(name) => {
                write!(f, "Container dropped before lazy dependency {} was resolved", name)
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for container operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
///
/// # Examples
///
/// ```rust
/// use constitute::{DiResult, DiError};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::Unconstructible("some_key"))
/// }
///
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
