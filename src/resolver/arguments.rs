//! Cursor over resolved constituents handed to raw builders.

use std::any::Any;
use std::sync::Arc;

use super::{Lazy, Resolved};
use crate::error::{DiError, DiResult};
use crate::instance::Instance;

/// Resolved constituents in declared order.
///
/// Builders read arguments front to back with the accessor matching the
/// resolver each constituent was declared with. Reading past the end fails
/// with [`DiError::MissingArgument`]; reading a constituent through the wrong
/// accessor fails with [`DiError::UnexpectedArgument`].
///
/// # Examples
///
/// ```rust
/// use constitute::{Container, Constitutor, Key, Resolver};
///
/// let container = Container::new();
/// container.bind_value(Key::named("port"), 8080u16);
/// container.bind_method(
///     Key::named("address"),
///     |_, args| {
///         let port = args.instance::<u16>()?;
///         let tls = args.optional::<bool>()?;
///         Ok(constitute::Instance::new(format!("0.0.0.0:{} tls={:?}", port, tls)))
///     },
///     Some(Constitutor::singleton([
///         Resolver::instance(Key::named("port")),
///         Resolver::optional(Key::named("tls")),
///     ])),
/// );
///
/// let address = container.get::<String>(&Key::named("address")).unwrap();
/// assert_eq!(address.as_str(), "0.0.0.0:8080 tls=None");
/// ```
#[derive(Debug)]
pub struct Arguments {
    owner: &'static str,
    values: std::vec::IntoIter<Resolved>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(owner: &'static str, values: Vec<Resolved>) -> Self {
        Self { owner, values: values.into_iter(), position: 0 }
    }

    /// Name of the class or binding the arguments are for.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Number of arguments not yet read.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Reads the next argument in whatever shape it was resolved.
    pub fn resolved(&mut self) -> DiResult<Resolved> {
        let value = self
            .values
            .next()
            .ok_or(DiError::MissingArgument { owner: self.owner, index: self.position })?;
        self.position += 1;
        Ok(value)
    }

    /// Reads an eagerly resolved argument without downcasting it.
    pub fn raw(&mut self) -> DiResult<Instance> {
        match self.resolved()? {
            Resolved::Instance(instance) => Ok(instance),
            _ => Err(self.unexpected("an instance")),
        }
    }

    /// Reads an eagerly resolved argument as `T`.
    pub fn instance<T: Any + Send + Sync>(&mut self) -> DiResult<Arc<T>> {
        self.raw()?.downcast::<T>()
    }

    /// Reads an eagerly resolved shared trait object.
    pub fn shared<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        self.raw()?.downcast_shared::<T>()
    }

    /// Reads a collection argument, every element as `T`.
    pub fn all<T: Any + Send + Sync>(&mut self) -> DiResult<Vec<Arc<T>>> {
        match self.resolved()? {
            Resolved::All(instances) => instances.iter().map(Instance::downcast::<T>).collect(),
            _ => Err(self.unexpected("a collection")),
        }
    }

    /// Reads a deferred argument.
    pub fn lazy(&mut self) -> DiResult<Lazy> {
        match self.resolved()? {
            Resolved::Lazy(lazy) => Ok(lazy),
            _ => Err(self.unexpected("a lazy")),
        }
    }

    /// Reads an optional argument. Eager arguments are accepted too, with a
    /// null instance read as `None`.
    pub fn optional<T: Any + Send + Sync>(&mut self) -> DiResult<Option<Arc<T>>> {
        let instance = match self.resolved()? {
            Resolved::Optional(None) => return Ok(None),
            Resolved::Optional(Some(instance)) | Resolved::Instance(instance) => instance,
            _ => return Err(self.unexpected("an optional")),
        };
        if instance.is_null() {
            return Ok(None);
        }
        instance.downcast::<T>().map(Some)
    }

    fn unexpected(&self, expected: &'static str) -> DiError {
        DiError::UnexpectedArgument { owner: self.owner, index: self.position - 1, expected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments(values: Vec<Resolved>) -> Arguments {
        Arguments::new("Owner", values)
    }

    #[test]
    fn test_reads_in_declared_order() {
        let mut args = arguments(vec![
            Resolved::Instance(Instance::new(1u8)),
            Resolved::All(vec![Instance::new(2u8), Instance::new(3u8)]),
            Resolved::Optional(None),
        ]);
        assert_eq!(args.remaining(), 3);
        assert_eq!(*args.instance::<u8>().unwrap(), 1);
        let all: Vec<u8> = args.all::<u8>().unwrap().iter().map(|v| **v).collect();
        assert_eq!(all, vec![2, 3]);
        assert!(args.optional::<u8>().unwrap().is_none());
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn test_missing_argument() {
        let mut args = arguments(vec![Resolved::Instance(Instance::new(1u8))]);
        args.raw().unwrap();
        assert_eq!(
            args.raw().unwrap_err(),
            DiError::MissingArgument { owner: "Owner", index: 1 }
        );
    }

    #[test]
    fn test_wrong_shape_reports_index() {
        let mut args = arguments(vec![
            Resolved::Instance(Instance::new(1u8)),
            Resolved::All(Vec::new()),
        ]);
        args.raw().unwrap();
        assert_eq!(
            args.lazy().unwrap_err(),
            DiError::UnexpectedArgument { owner: "Owner", index: 1, expected: "a lazy" }
        );
    }

    #[test]
    fn test_optional_accepts_null_instance() {
        let mut args = arguments(vec![
            Resolved::Instance(Instance::null()),
            Resolved::Optional(Some(Instance::new(5u32))),
        ]);
        assert!(args.optional::<u32>().unwrap().is_none());
        assert_eq!(*args.optional::<u32>().unwrap().unwrap(), 5);
    }
}
