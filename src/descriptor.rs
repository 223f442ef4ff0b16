//! Type descriptors and the construction engine.
//!
//! A [`TypeDescriptor`] captures, at registration time, how to build an
//! instance of the registered type: a constructor closure and optionally a
//! factory closure (the `CreateMethod` route, which may be asynchronous).
//! Both are stored type-erased so descriptors can live in the shared entry
//! map and be cloned out of it cheaply.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};

/// Type-erased `Arc` for stored and resolved values.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased construction argument value.
pub(crate) type ArgBox = Box<dyn Any + Send>;

/// Boxed future used by the factory route.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type CtorThunk = Arc<dyn Fn(Option<ArgBox>) -> RegistryResult<AnyArc> + Send + Sync>;
type FactoryThunk = Arc<dyn Fn(Option<ArgBox>) -> BoxFuture<RegistryResult<AnyArc>> + Send + Sync>;

/// Binds the optional caller-supplied argument value to the argument type
/// the provider was registered with.
///
/// `None` requests the argument type's own defaults, which is also what a
/// caller gets by omitting arguments entirely. A present value must be
/// exactly the registered argument type.
fn bind_args<A>(args: Option<ArgBox>, target: &'static str) -> RegistryResult<A>
where
    A: Default + Send + 'static,
{
    match args {
        Some(boxed) => boxed.downcast::<A>().map(|a| *a).map_err(|_| {
            RegistryError::Construction {
                type_name: target,
                message: format!(
                    "argument value is not the registered argument type {}",
                    std::any::type_name::<A>()
                ),
            }
        }),
        None => Ok(A::default()),
    }
}

/// A constructible type provider.
///
/// Holds the constructor thunk and, when registered, the factory thunk.
/// The factory's presence is checked once at registration when the
/// `CreateMethod` behavior is requested; resolution never searches for it
/// again.
#[derive(Clone)]
pub struct TypeDescriptor {
    type_name: &'static str,
    ctor: CtorThunk,
    factory: Option<FactoryThunk>,
}

impl TypeDescriptor {
    /// Builds a descriptor from a constructor closure.
    ///
    /// The closure's argument type `A` becomes the descriptor's argument
    /// contract: resolutions either supply an `A` or get `A::default()`.
    pub(crate) fn new<T, A, F>(ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        A: Default + Send + 'static,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let thunk: CtorThunk = Arc::new(move |args| {
            let args = bind_args::<A>(args, type_name)?;
            Ok(Arc::new(ctor(args)) as AnyArc)
        });
        Self {
            type_name,
            ctor: thunk,
            factory: None,
        }
    }

    /// Attaches the factory route.
    ///
    /// The factory receives the same argument contract as the constructor
    /// and may fail or suspend; its future is awaited by the resolver.
    pub(crate) fn with_factory<T, A, F, Fut>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        A: Default + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RegistryResult<T>> + Send + 'static,
    {
        let type_name = self.type_name;
        let thunk: FactoryThunk = Arc::new(move |args| {
            let args = bind_args::<A>(args, type_name);
            let fut = args.map(&factory);
            Box::pin(async move {
                let value = fut?.await?;
                Ok(Arc::new(value) as AnyArc)
            })
        });
        self.factory = Some(thunk);
        self
    }

    /// Invokes the constructor with the bound arguments.
    ///
    /// Every call produces a distinct instance; no state is shared between
    /// independent constructions.
    pub(crate) fn construct(&self, args: Option<ArgBox>) -> RegistryResult<AnyArc> {
        (self.ctor)(args)
    }

    /// Invokes the factory route with the bound arguments, awaiting its
    /// result.
    ///
    /// Callers reach this only through a `CreateMethod` decoration, which
    /// validated the factory's presence at registration; its absence here
    /// is a registry bug.
    pub(crate) async fn create(&self, args: Option<ArgBox>) -> RegistryResult<AnyArc> {
        match &self.factory {
            Some(factory) => factory(args).await,
            None => Err(RegistryError::InvalidDecoratorState(self.type_name)),
        }
    }

    pub(crate) fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Name of the type this descriptor constructs.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Args {
        value: u32,
    }

    struct Widget {
        value: u32,
    }

    #[test]
    fn construct_binds_explicit_args() {
        let desc = TypeDescriptor::new(|a: Args| Widget { value: a.value });
        let built = desc.construct(Some(Box::new(Args { value: 7 }))).unwrap();
        assert_eq!(built.downcast_ref::<Widget>().unwrap().value, 7);
    }

    #[test]
    fn construct_defaults_when_args_omitted() {
        let desc = TypeDescriptor::new(|a: Args| Widget { value: a.value });
        let built = desc.construct(None).unwrap();
        assert_eq!(built.downcast_ref::<Widget>().unwrap().value, 0);
    }

    #[test]
    fn construct_rejects_wrong_arg_type() {
        let desc = TypeDescriptor::new(|a: Args| Widget { value: a.value });
        let err = desc.construct(Some(Box::new("wrong"))).unwrap_err();
        assert!(matches!(err, RegistryError::Construction { .. }));
    }

    #[tokio::test]
    async fn create_without_factory_is_a_registry_bug() {
        let desc = TypeDescriptor::new(|a: Args| Widget { value: a.value });
        let err = desc.create(None).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDecoratorState(_)));
    }

    #[tokio::test]
    async fn create_awaits_factory_result() {
        let desc = TypeDescriptor::new(|a: Args| Widget { value: a.value })
            .with_factory(|a: Args| async move { Ok(Widget { value: a.value + 100 }) });
        let built = desc.create(Some(Box::new(Args { value: 1 }))).await.unwrap();
        assert_eq!(built.downcast_ref::<Widget>().unwrap().value, 101);
    }
}
