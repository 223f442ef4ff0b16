//! Blocking facade over the suspending registry surface.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::behavior::Behavior;
use crate::entry::EntryDescriptor;
use crate::error::RegistryResult;
use crate::registry::{Registry, Resolution};

/// Synchronous view of a [`Registry`], for callers outside an async
/// context.
///
/// Built from an explicit runtime [`Handle`] rather than spinning a hidden
/// runtime per call: a blocked operation waits on the caller's own
/// runtime, and `Handle::block_on` panics if invoked from inside a runtime
/// worker thread — blocking a limited worker pool on its own work is a
/// deadlock, not a wait.
///
/// # Examples
///
/// ```rust
/// use bindery::{BlockingRegistry, Registry};
/// use std::sync::Arc;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let registry = BlockingRegistry::new(Arc::new(Registry::new()), rt.handle().clone());
///
/// registry.register_instance("hello".to_string());
/// let greeting = registry.get::<String>().unwrap();
/// assert_eq!(&*greeting, "hello");
/// ```
#[derive(Clone)]
pub struct BlockingRegistry {
    inner: Arc<Registry>,
    handle: Handle,
}

impl BlockingRegistry {
    /// Wraps a shared registry with a runtime handle to block on.
    pub fn new(inner: Arc<Registry>, handle: Handle) -> Self {
        Self { inner, handle }
    }

    /// The underlying suspending registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner
    }

    fn wait<F: Future>(&self, fut: F) -> F::Output {
        self.handle.block_on(fut)
    }

    // ----- Registration -----

    /// Blocking form of [`Registry::register_instance`].
    pub fn register_instance<T: Send + Sync + 'static>(&self, value: T) {
        self.wait(self.inner.register_instance(value))
    }

    /// Blocking form of [`Registry::register_instance_with`].
    pub fn register_instance_with<T: Send + Sync + 'static>(
        &self,
        value: T,
        behavior: Behavior,
    ) -> RegistryResult<()> {
        self.wait(self.inner.register_instance_with(value, behavior))
    }

    /// Blocking form of [`Registry::register_type`].
    pub fn register_type<T, A, F>(&self, ctor: F)
    where
        T: Send + Sync + 'static,
        A: Default + Send + 'static,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.wait(self.inner.register_type(ctor))
    }

    /// Blocking form of [`Registry::register_type_with`].
    pub fn register_type_with<T, A, F>(&self, ctor: F, behavior: Behavior) -> RegistryResult<()>
    where
        T: Send + Sync + 'static,
        A: Default + Send + 'static,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.wait(self.inner.register_type_with(ctor, behavior))
    }

    /// Blocking form of [`Registry::register_with_factory`].
    pub fn register_with_factory<T, A, C, F, Fut>(
        &self,
        ctor: C,
        factory: F,
        behavior: Behavior,
    ) -> RegistryResult<()>
    where
        T: Send + Sync + 'static,
        A: Default + Send + 'static,
        C: Fn(A) -> T + Send + Sync + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RegistryResult<T>> + Send + 'static,
    {
        self.wait(self.inner.register_with_factory(ctor, factory, behavior))
    }

    /// Blocking form of [`Registry::clear`].
    pub fn clear(&self) {
        self.wait(self.inner.clear())
    }

    // ----- Introspection -----

    /// Blocking form of [`Registry::contains`].
    pub fn contains<T: 'static>(&self) -> bool {
        self.wait(self.inner.contains::<T>())
    }

    /// Blocking form of [`Registry::len`].
    pub fn len(&self) -> usize {
        self.wait(self.inner.len())
    }

    /// Blocking form of [`Registry::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.wait(self.inner.is_empty())
    }

    /// Blocking form of [`Registry::descriptors`].
    pub fn descriptors(&self) -> Vec<EntryDescriptor> {
        self.wait(self.inner.descriptors())
    }

    // ----- Resolution -----

    /// Blocking form of [`Registry::get`].
    pub fn get<T: Send + Sync + 'static>(&self) -> RegistryResult<Arc<T>> {
        self.wait(self.inner.get::<T>())
    }

    /// Blocking form of [`Registry::get_with`].
    pub fn get_with<T, A>(&self, args: A) -> RegistryResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        self.wait(self.inner.get_with::<T, A>(args))
    }

    /// Blocking form of [`Registry::get_or_else`].
    pub fn get_or_else<T, F>(&self, fallback: F) -> RegistryResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.wait(self.inner.get_or_else(fallback))
    }

    /// Blocking form of [`Registry::get_with_initializer`].
    pub fn get_with_initializer<T, I>(&self, init: I) -> RegistryResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        I: Fn(&T) + Send + Sync + 'static,
    {
        self.wait(self.inner.get_with_initializer(init))
    }

    /// Blocking form of [`Registry::resolve`].
    pub fn resolve<T: Send + Sync + 'static>(
        &self,
        resolution: Resolution<T>,
    ) -> RegistryResult<Arc<T>> {
        self.wait(self.inner.resolve(resolution))
    }
}

impl std::fmt::Debug for BlockingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingRegistry").finish_non_exhaustive()
    }
}
