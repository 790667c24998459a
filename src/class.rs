//! Constructible types and their dependency declarations.
//!
//! A type opts into construction by the container by implementing
//! [`Constitute`]. The associated [`Constitute::constitute`] function is the
//! type's static dependency declaration; types that do not override it are
//! built with no constituents under the Singleton lifetime.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use crate::constitutor::Constitutor;
use crate::error::{DiError, DiResult};
use crate::instance::Instance;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::resolver::{Arguments, Resolver};

/// Placeholder used in messages for classes without a name.
pub const ANONYMOUS: &str = "[anonymous]";

/// Capability for types the container can construct.
///
/// # Examples
///
/// ```rust
/// use constitute::{Arguments, Constitute, Container, Declaration, DiResult, Key};
/// use std::sync::Arc;
///
/// struct Database;
/// impl Constitute for Database {
///     fn construct(_: &mut Arguments) -> DiResult<Self> {
///         Ok(Database)
///     }
/// }
///
/// struct Repository {
///     db: Arc<Database>,
/// }
/// impl Constitute for Repository {
///     fn constitute() -> Option<Declaration> {
///         Some(Declaration::constituents([Key::class::<Database>()]))
///     }
///     fn construct(args: &mut Arguments) -> DiResult<Self> {
///         Ok(Repository { db: args.instance()? })
///     }
/// }
///
/// let container = Container::new();
/// let repo = container.resolve::<Repository>().unwrap();
/// assert!(Arc::ptr_eq(&repo.db, &container.resolve::<Database>().unwrap()));
/// ```
pub trait Constitute: Any + Send + Sync + Sized {
    /// Static dependency declaration. `None` means no constituents and the
    /// Singleton lifetime.
    fn constitute() -> Option<Declaration> {
        None
    }

    /// Builds the value from arguments resolved in declared order.
    fn construct(args: &mut Arguments) -> DiResult<Self>;
}

/// Result of a class dependency declaration.
pub enum Declaration {
    /// Ordered constituents, constituted under the Singleton lifetime
    Constituents(Vec<Resolver>),
    /// A preconstructed constitutor
    Constitutor(Constitutor),
    /// A type-erased declaration checked when the class is bound. Accepted
    /// payloads are `Vec<Resolver>`, `Vec<Key>` and `Constitutor`.
    Dynamic(Box<dyn Any + Send + Sync>, &'static str),
}

impl Declaration {
    pub fn constituents<I, R>(constituents: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resolver>,
    {
        Declaration::Constituents(constituents.into_iter().map(Into::into).collect())
    }

    pub fn dynamic<T: Any + Send + Sync>(value: T) -> Self {
        Declaration::Dynamic(Box::new(value), type_name::<T>())
    }
}

impl From<Constitutor> for Declaration {
    fn from(constitutor: Constitutor) -> Self {
        Declaration::Constitutor(constitutor)
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Constituents(list) => f.debug_tuple("Constituents").field(list).finish(),
            Declaration::Constitutor(constitutor) => {
                f.debug_tuple("Constitutor").field(constitutor).finish()
            }
            Declaration::Dynamic(_, found) => f.debug_tuple("Dynamic").field(found).finish(),
        }
    }
}

type Declare = fn() -> Option<Declaration>;
type Construct = fn(&mut Arguments) -> DiResult<Instance>;

/// Handle to a constructible type: its identity, name, declaration and
/// constructor.
#[derive(Clone, Copy)]
pub struct Class {
    id: TypeId,
    name: Option<&'static str>,
    declare: Declare,
    construct: Construct,
}

impl Class {
    pub fn of<T: Constitute>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: Some(type_name::<T>()),
            declare: T::constitute,
            construct: construct_erased::<T>,
        }
    }

    /// Describes a class from parts, for hosts that register constructors at
    /// runtime. A class without a name is reported as `[anonymous]`.
    pub fn custom(
        id: TypeId,
        name: Option<&'static str>,
        declare: Declare,
        construct: Construct,
    ) -> Self {
        Self { id, name, declare, construct }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name.unwrap_or(ANONYMOUS)
    }

    /// Runs the raw dependency declaration.
    pub fn declaration(&self) -> Option<Declaration> {
        (self.declare)()
    }

    /// Validates the declaration and turns it into the class's constitutor.
    pub fn constitutor(&self) -> DiResult<Constitutor> {
        match self.declaration() {
            None => Ok(Constitutor::from(Lifetime::Singleton)),
            Some(Declaration::Constituents(list)) => Ok(Constitutor::singleton(list)),
            Some(Declaration::Constitutor(constitutor)) => Ok(constitutor),
            Some(Declaration::Dynamic(value, found)) => {
                let value = match value.downcast::<Vec<Resolver>>() {
                    Ok(list) => return Ok(Constitutor::singleton(*list)),
                    Err(value) => value,
                };
                let value = match value.downcast::<Vec<Key>>() {
                    Ok(list) => return Ok(Constitutor::singleton(*list)),
                    Err(value) => value,
                };
                match value.downcast::<Constitutor>() {
                    Ok(constitutor) => Ok(*constitutor),
                    Err(_) => Err(DiError::InvalidDeclaration { class: self.name(), found }),
                }
            }
        }
    }

    pub fn construct(&self, args: &mut Arguments) -> DiResult<Instance> {
        (self.construct)(args)
    }
}

fn construct_erased<T: Constitute>(args: &mut Arguments) -> DiResult<Instance> {
    T::construct(args).map(Instance::new)
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.name())
    }
}
