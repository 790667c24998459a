//! Binding key types for the container.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::class::{Class, Constitute};
use crate::factory::{Factory, FactoryId};

/// Key for binding storage and lookup.
///
/// Keys are compared by identity, never structurally: types by `TypeId`,
/// named keys by their name and ad-hoc factories by factory identity.
///
/// # Key Types
///
/// - **Class**: a constructible type. Unbound class keys are constructed
///   implicitly from the type's own dependency declaration.
/// - **Type**: any other `'static` type used as a token (trait objects,
///   foreign types). Equal to the `Class` key of the same type.
/// - **Named**: an arbitrary value key.
/// - **Factory**: an ad-hoc factory used directly as the key.
///
/// # Examples
///
/// ```rust
/// use constitute::{Container, Key};
///
/// let container = Container::new();
/// container.bind_value(Key::named("database.url"), "postgres://localhost".to_string());
///
/// let url = container.get::<String>(&Key::named("database.url")).unwrap();
/// assert_eq!(url.as_str(), "postgres://localhost");
/// assert_eq!(Key::named("database.url").display_name(), "database.url");
/// ```
#[derive(Clone)]
pub enum Key {
    /// Constructible type key
    Class(Class),
    /// Type token with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Arbitrary value key
    Named(&'static str),
    /// Ad-hoc factory key, compared by factory identity
    Factory(Arc<Factory>),
}

impl Key {
    /// Type token for any `'static` type, including trait objects.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Constructible key for a type implementing [`Constitute`].
    pub fn class<T: Constitute>() -> Self {
        Key::Class(Class::of::<T>())
    }

    pub fn named(name: &'static str) -> Self {
        Key::Named(name)
    }

    /// Wraps an ad-hoc factory so it can be constituted directly.
    pub fn factory(factory: Factory) -> Self {
        Key::Factory(Arc::new(factory))
    }

    /// Get the type or key name for display
    ///
    /// # Examples
    ///
    /// ```rust
    /// use constitute::Key;
    ///
    /// assert_eq!(Key::of::<String>().display_name(), "alloc::string::String");
    /// assert_eq!(Key::named("port").display_name(), "port");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Class(class) => class.name(),
            Key::Type(_, name) => name,
            Key::Named(name) => name,
            Key::Factory(_) => "[factory]",
        }
    }

    /// The class this key can construct implicitly, if any.
    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Key::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Returns true if an unbound key can still be constituted.
    pub fn is_constructible(&self) -> bool {
        matches!(self, Key::Class(_) | Key::Factory(_))
    }

    fn type_identity(&self) -> Option<TypeId> {
        match self {
            Key::Class(class) => Some(class.id()),
            Key::Type(id, _) => Some(*id),
            _ => None,
        }
    }

    fn factory_identity(&self) -> Option<FactoryId> {
        match self {
            Key::Factory(factory) => Some(factory.id()),
            _ => None,
        }
    }
}

// Class and Type keys of the same TypeId address the same binding entry
impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.type_identity(), other.type_identity()) {
            return a == b;
        }
        match (self, other) {
            (Key::Named(a), Key::Named(b)) => a == b,
            (Key::Factory(_), Key::Factory(_)) => self.factory_identity() == other.factory_identity(),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Class(_) | Key::Type(_, _) => {
                0u8.hash(state);
                self.type_identity().hash(state);
            }
            Key::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Key::Factory(factory) => {
                2u8.hash(state);
                factory.id().hash(state);
            }
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Class(class) => write!(f, "Key::Class({})", class.name()),
            Key::Type(_, name) => write!(f, "Key::Type({})", name),
            Key::Named(name) => write!(f, "Key::Named({:?})", name),
            Key::Factory(factory) => write!(f, "Key::Factory({:?})", factory.id()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<Class> for Key {
    fn from(class: Class) -> Self {
        Key::Class(class)
    }
}

impl From<Factory> for Key {
    fn from(factory: Factory) -> Self {
        Key::factory(factory)
    }
}

impl From<Arc<Factory>> for Key {
    fn from(factory: Arc<Factory>) -> Self {
        Key::Factory(factory)
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}
