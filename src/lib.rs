//! # bindery
//!
//! A process-wide registry that binds abstraction keys (Rust types) to
//! concrete providers and resolves them into shared `Arc` instances on
//! demand, with configurable instantiation policy.
//!
//! ## Features
//!
//! - **Provider shapes**: a ready-made instance, or a constructible type
//!   described by a constructor closure (optionally plus a factory route)
//! - **Behavior flags**: `LAZY_SINGLETON` (construct once, cache for all
//!   later resolutions) and `CREATE_METHOD` (route construction through a
//!   registered factory, which may be asynchronous); flags combine
//! - **Thread-safe**: shared-read resolution, exclusive-write
//!   registration, and an at-most-one-published-construction guarantee for
//!   lazy singletons under arbitrary concurrent first access
//! - **Dual surface**: suspending `async fn` methods, plus a
//!   [`BlockingRegistry`] facade over an explicit runtime handle
//!
//! ## Quick Start
//!
//! ```rust
//! use bindery::{Behavior, Registry};
//!
//! #[derive(Default)]
//! struct PoolArgs {
//!     size: usize,
//! }
//!
//! struct ConnectionPool {
//!     size: usize,
//! }
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let registry = Registry::new();
//!
//!     // Construct once on first resolution, cache forever.
//!     registry
//!         .register_type_with(
//!             |args: PoolArgs| ConnectionPool { size: args.size.max(1) },
//!             Behavior::LAZY_SINGLETON,
//!         )
//!         .await
//!         .unwrap();
//!
//!     let a = registry.get_with::<ConnectionPool, _>(PoolArgs { size: 8 }).await.unwrap();
//!     let b = registry.get::<ConnectionPool>().await.unwrap();
//!
//!     // Same cached instance; the second argument list was ignored.
//!     assert!(std::sync::Arc::ptr_eq(&a, &b));
//!     assert_eq!(b.size, 8);
//! });
//! ```
//!
//! ## Instantiation policy
//!
//! - **Instance**: [`Registry::register_instance`] stores an object that
//!   every resolution returns unchanged
//! - **Standard type**: [`Registry::register_type`] constructs a distinct
//!   instance per resolution
//! - **Lazy singleton**: `Behavior::LAZY_SINGLETON` caches the first
//!   resolution; the winning candidate is published under the entry's
//!   write lock and racers discard theirs
//! - **Factory route**: `Behavior::CREATE_METHOD` constructs through the
//!   factory registered with [`Registry::register_with_factory`]; the
//!   factory may suspend and may fail
//!
//! Per-call options — explicit argument values, an initializer that runs
//! on every resolution's result, a non-caching fallback for unregistered
//! keys, and a cancellation token — travel in a [`Resolution`].

mod behavior;
mod blocking;
mod cancellation;
mod decorator;
mod descriptor;
mod entry;
mod error;
mod global;
mod key;
mod registry;

pub use behavior::Behavior;
pub use blocking::BlockingRegistry;
pub use cancellation::CancellationToken;
pub use entry::{EntryDescriptor, EntryKind};
pub use error::{RegistryError, RegistryResult};
pub use global::global;
pub use key::Key;
pub use registry::{Registry, Resolution};
