//! The registry: a map of abstraction keys to provider entries, with the
//! suspending operation surface.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::behavior::Behavior;
use crate::cancellation::CancellationToken;
use crate::decorator;
use crate::descriptor::{AnyArc, ArgBox, TypeDescriptor};
use crate::entry::{Entry, EntryDescriptor};
use crate::error::{RegistryError, RegistryResult};
use crate::key::Key;

/// Options for a single resolution call.
///
/// Carries the optional construction arguments, an initializer applied to
/// every resolution's result, a fallback factory for unregistered keys,
/// and a cancellation token. The plain `get` family on [`Registry`] covers
/// the common combinations; `resolve` takes the full set.
///
/// # Examples
///
/// ```rust
/// use bindery::{Registry, Resolution};
///
/// struct Config {
///     verbose: bool,
/// }
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let registry = Registry::new();
///     let config = registry
///         .resolve(Resolution::<Config>::new().or_else(|| Config { verbose: false }))
///         .await
///         .unwrap();
///     assert!(!config.verbose);
/// });
/// ```
pub struct Resolution<T> {
    args: Option<ArgBox>,
    init: Option<Box<dyn Fn(&T) + Send + Sync>>,
    fallback: Option<Box<dyn FnOnce() -> T + Send>>,
    cancel: Option<CancellationToken>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Resolution<T> {
    /// An empty resolution request: default arguments, no initializer, no
    /// fallback.
    pub fn new() -> Self {
        Self {
            args: None,
            init: None,
            fallback: None,
            cancel: None,
            _marker: PhantomData,
        }
    }

    /// Supplies an explicit argument value for construction. Omitting this
    /// requests the registered argument type's own defaults.
    pub fn args<A: Send + 'static>(mut self, args: A) -> Self {
        self.args = Some(Box::new(args));
        self
    }

    /// Runs on the result of every resolution, including cached singletons
    /// and stored instances.
    pub fn initializer(mut self, init: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    /// Invoked only when the key has no entry; its result is returned but
    /// never stored in the registry.
    pub fn or_else(mut self, fallback: impl FnOnce() -> T + Send + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Abandons the resolution if `token` is cancelled before construction
    /// begins. A constructor or factory that has started always runs to
    /// completion.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl<T: Send + Sync + 'static> Default for Resolution<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-shareable registry binding abstraction keys to providers.
///
/// Registrations and clears take exclusive access to the entry map and are
/// linearizable; resolutions take shared access, so unrelated keys resolve
/// concurrently. Lazy-singleton publication locks only the one entry being
/// published.
///
/// All methods suspend at lock-acquisition points and while awaiting an
/// in-flight factory; see [`BlockingRegistry`](crate::BlockingRegistry)
/// for the synchronous surface.
///
/// # Examples
///
/// ```rust
/// use bindery::{Behavior, Registry};
///
/// #[derive(Default)]
/// struct CarArgs {
///     capacity: u32,
/// }
///
/// struct Car {
///     capacity: u32,
/// }
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let registry = Registry::new();
///     registry
///         .register_type(|args: CarArgs| Car { capacity: args.capacity.max(5) })
///         .await;
///
///     let default_car = registry.get::<Car>().await.unwrap();
///     assert_eq!(default_car.capacity, 5);
///
///     let big_car = registry.get_with::<Car, _>(CarArgs { capacity: 17 }).await.unwrap();
///     assert_eq!(big_car.capacity, 17);
/// });
/// ```
pub struct Registry {
    entries: RwLock<HashMap<Key, Entry>>,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // ----- Registration -----

    /// Registers a ready-made instance under its type. Resolution returns
    /// the same object on every call.
    pub async fn register_instance<T: Send + Sync + 'static>(&self, value: T) {
        // Instance + standard behavior cannot fail validation.
        self.register_instance_with(value, Behavior::STANDARD)
            .await
            .unwrap_or_else(|_| unreachable!("standard instance registration is infallible"));
    }

    /// Registers a ready-made instance with explicit behavior flags.
    ///
    /// Any non-standard flag is a configuration error: `LazySingleton`
    /// requires a constructible type provider, and `CreateMethod` requires
    /// a factory, neither of which an instance has. On error nothing is
    /// written.
    pub async fn register_instance_with<T: Send + Sync + 'static>(
        &self,
        value: T,
        behavior: Behavior,
    ) -> RegistryResult<()> {
        let key = Key::of::<T>();
        if behavior.contains(Behavior::LAZY_SINGLETON) {
            return Err(RegistryError::Configuration(
                key.type_name(),
                "LazySingleton behavior requires a constructible type provider, not an instance",
            ));
        }
        if behavior.contains(Behavior::CREATE_METHOD) {
            return Err(RegistryError::Configuration(
                key.type_name(),
                "CreateMethod behavior requires a registered factory",
            ));
        }
        self.insert(key, Entry::Instance(Arc::new(value))).await;
        Ok(())
    }

    /// Registers a constructible type with standard behavior: every
    /// resolution runs `ctor` and yields a distinct instance.
    ///
    /// The closure's argument type `A` is the type's argument contract:
    /// `get` supplies `A::default()`, `get_with` an explicit value.
    pub async fn register_type<T, A, F>(&self, ctor: F)
    where
        T: Send + Sync + 'static,
        A: Default + Send + 'static,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.register_type_with(ctor, Behavior::STANDARD)
            .await
            .unwrap_or_else(|_| unreachable!("standard type registration is infallible"));
    }

    /// Registers a constructible type with behavior flags.
    ///
    /// `CreateMethod` without a factory is rejected here, at registration,
    /// with nothing written; use `register_with_factory` for that route.
    pub async fn register_type_with<T, A, F>(
        &self,
        ctor: F,
        behavior: Behavior,
    ) -> RegistryResult<()>
    where
        T: Send + Sync + 'static,
        A: Default + Send + 'static,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        let entry = decorator::decorate(TypeDescriptor::new(ctor), behavior)?;
        self.insert(Key::of::<T>(), entry).await;
        Ok(())
    }

    /// Registers a constructible type carrying both a constructor and a
    /// factory route.
    ///
    /// The factory is used when `behavior` contains `CreateMethod`; it may
    /// suspend and may fail. Both closures share the argument contract
    /// `A`.
    pub async fn register_with_factory<T, A, C, F, Fut>(
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
        let descriptor = TypeDescriptor::new(ctor).with_factory(factory);
        let entry = decorator::decorate(descriptor, behavior)?;
        self.insert(Key::of::<T>(), entry).await;
        Ok(())
    }

    async fn insert(&self, key: Key, entry: Entry) {
        let mut entries = self.entries.write().await;
        let replaced = entries.insert(key, entry).is_some();
        debug!(key = %key, replaced, "registered provider");
    }

    /// Atomically removes every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        debug!(count, "cleared registry");
    }

    // ----- Introspection -----

    /// Whether an entry exists for `T`.
    pub async fn contains<T: 'static>(&self) -> bool {
        self.entries.read().await.contains_key(&Key::of::<T>())
    }

    /// Number of registered entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the registry has no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of every registration, for diagnostics.
    pub async fn descriptors(&self) -> Vec<EntryDescriptor> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(key, entry)| EntryDescriptor {
                key: *key,
                kind: entry.kind(),
                behavior: entry.behavior(),
            })
            .collect()
    }

    // ----- Resolution -----

    /// Resolves `T` with default arguments.
    pub async fn get<T: Send + Sync + 'static>(&self) -> RegistryResult<Arc<T>> {
        self.resolve(Resolution::new()).await
    }

    /// Resolves `T` with an explicit argument value.
    pub async fn get_with<T, A>(&self, args: A) -> RegistryResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        self.resolve(Resolution::new().args(args)).await
    }

    /// Resolves `T`, invoking `fallback` if no entry exists. The fallback
    /// result is not stored: a later `get` without fallback still fails.
    pub async fn get_or_else<T, F>(&self, fallback: F) -> RegistryResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.resolve(Resolution::new().or_else(fallback)).await
    }

    /// Resolves `T`, running `init` on the result — on every call, even
    /// when the result is a cached singleton or a stored instance.
    pub async fn get_with_initializer<T, I>(&self, init: I) -> RegistryResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        I: Fn(&T) + Send + Sync + 'static,
    {
        self.resolve(Resolution::new().initializer(init)).await
    }

    /// Resolves `T` with the full set of per-call options.
    pub async fn resolve<T: Send + Sync + 'static>(
        &self,
        resolution: Resolution<T>,
    ) -> RegistryResult<Arc<T>> {
        let Resolution {
            args,
            init,
            fallback,
            cancel,
            ..
        } = resolution;
        let key = Key::of::<T>();

        check_cancelled(&cancel, &key)?;
        let entry = { self.entries.read().await.get(&key).cloned() };

        let Some(entry) = entry else {
            if let Some(fallback) = fallback {
                trace!(key = %key, "resolving unregistered key through fallback");
                let value = Arc::new(fallback());
                if let Some(init) = &init {
                    init(&value);
                }
                return Ok(value);
            }
            return Err(RegistryError::NotRegistered(key.type_name()));
        };

        match entry {
            Entry::Instance(value) => {
                let value = downcast_stored::<T>(value, &key)?;
                if let Some(init) = &init {
                    init(&value);
                }
                Ok(value)
            }
            Entry::Type(descriptor) => {
                check_cancelled(&cancel, &key)?;
                let value = downcast_stored::<T>(descriptor.construct(args)?, &key)?;
                if let Some(init) = &init {
                    init(&value);
                }
                Ok(value)
            }
            Entry::Decorated(decorated) => {
                check_cancelled(&cancel, &key)?;
                let erased_init = init.map(|init| {
                    Box::new(move |value: &AnyArc| {
                        if let Some(value) = value.downcast_ref::<T>() {
                            init(value);
                        }
                    }) as Box<decorator::InitFn>
                });
                let value =
                    decorator::resolve(&decorated, args, erased_init.as_deref()).await?;
                downcast_stored::<T>(value, &key)
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

fn check_cancelled(cancel: &Option<CancellationToken>, key: &Key) -> RegistryResult<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(RegistryError::Cancelled(key.type_name())),
        _ => Ok(()),
    }
}

fn downcast_stored<T: Any + Send + Sync>(value: AnyArc, key: &Key) -> RegistryResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| RegistryError::Construction {
            type_name: key.type_name(),
            message: "stored value has a different type than its key".to_string(),
        })
}
