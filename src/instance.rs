//! Type-erased instances produced by factories.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

/// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// A constituted value, or the explicit absence produced by a null binding.
///
/// Instances are cheap to clone: cloning shares the underlying `Arc`, so two
/// clones of a cached singleton are the same object.
///
/// # Examples
///
/// ```rust
/// use constitute::Instance;
/// use std::sync::Arc;
///
/// let port = Instance::new(8080u16);
/// assert_eq!(*port.downcast::<u16>().unwrap(), 8080);
/// assert!(port.downcast::<String>().is_err());
///
/// let same = port.clone();
/// assert!(port.ptr_eq(&same));
///
/// assert!(Instance::null().is_null());
/// ```
#[derive(Clone, Default)]
pub struct Instance {
    inner: Option<AnyArc>,
}

impl Instance {
    /// Wraps a value in a new shared instance.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an existing `Arc` without copying the value.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self { inner: Some(value as AnyArc) }
    }

    /// Wraps an already type-erased value.
    pub fn from_any(value: AnyArc) -> Self {
        Self { inner: Some(value) }
    }

    /// Wraps a shared trait object. Read it back with
    /// [`downcast_shared`](Self::downcast_shared).
    pub fn shared<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self::new(value)
    }

    /// The absent value.
    pub fn null() -> Self {
        Self { inner: None }
    }

    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Returns true if the instance holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_ref().is_some_and(|value| (**value).is::<T>())
    }

    pub fn as_any(&self) -> Option<&AnyArc> {
        self.inner.as_ref()
    }

    pub fn into_any(self) -> Option<AnyArc> {
        self.inner
    }

    /// Downcasts to a concrete type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        match &self.inner {
            Some(value) => value
                .clone()
                .downcast::<T>()
                .map_err(|_| DiError::TypeMismatch(type_name::<T>())),
            None => Err(DiError::NullInstance(type_name::<T>())),
        }
    }

    /// Downcasts an instance created with [`shared`](Self::shared).
    pub fn downcast_shared<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|err| match err {
                DiError::TypeMismatch(_) => DiError::TypeMismatch(type_name::<T>()),
                DiError::NullInstance(_) => DiError::NullInstance(type_name::<T>()),
                other => other,
            })
    }

    /// Identity comparison. Two null instances are equal.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ()),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(value) => write!(f, "Instance({:p})", Arc::as_ptr(value) as *const ()),
            None => f.write_str("Instance(null)"),
        }
    }
}
