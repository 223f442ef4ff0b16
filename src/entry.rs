//! The entry model: what the registry stores per abstraction key.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::behavior::Behavior;
use crate::descriptor::{AnyArc, TypeDescriptor};
use crate::key::Key;

/// What a decorated entry currently points at.
///
/// Starts as a descriptor and, for lazy singletons only, transitions to a
/// resolved value exactly once. It never transitions back.
pub(crate) enum Target {
    Descriptor(TypeDescriptor),
    Resolved(AnyArc),
}

/// A type provider wrapped with non-default instantiation behavior.
///
/// The target sits behind its own lock so that publishing a lazy singleton
/// only ever blocks resolutions of this entry, never unrelated keys.
pub(crate) struct DecoratedEntry {
    pub(crate) behavior: Behavior,
    pub(crate) type_name: &'static str,
    pub(crate) target: RwLock<Target>,
}

/// The variant stored per abstraction key.
#[derive(Clone)]
pub(crate) enum Entry {
    /// An already-constructed object, returned as-is on every resolution.
    Instance(AnyArc),
    /// A constructible type; each resolution constructs a new instance.
    Type(TypeDescriptor),
    /// A type provider with non-default behavior flags.
    Decorated(Arc<DecoratedEntry>),
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Instance(_) => f.write_str("Instance"),
            Entry::Type(_) => f.write_str("Type"),
            Entry::Decorated(_) => f.write_str("Decorated"),
        }
    }
}

impl Entry {
    pub(crate) fn kind(&self) -> EntryKind {
        match self {
            Entry::Instance(_) => EntryKind::Instance,
            Entry::Type(_) => EntryKind::Type,
            Entry::Decorated(_) => EntryKind::Decorated,
        }
    }

    pub(crate) fn behavior(&self) -> Behavior {
        match self {
            Entry::Instance(_) | Entry::Type(_) => Behavior::STANDARD,
            Entry::Decorated(decorated) => decorated.behavior,
        }
    }
}

/// Kind of entry stored for a key, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Ready-made instance
    Instance,
    /// Bare constructible type, standard behavior
    Type,
    /// Type provider wrapped with behavior flags
    Decorated,
}

/// Snapshot of one registration, for diagnostics and introspection.
///
/// # Examples
///
/// ```rust
/// use bindery::{Behavior, EntryKind, Registry};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let registry = Registry::new();
///     registry.register_instance(8080u16).await;
///
///     let descriptors = registry.descriptors().await;
///     assert_eq!(descriptors.len(), 1);
///     assert_eq!(descriptors[0].kind, EntryKind::Instance);
///     assert_eq!(descriptors[0].behavior, Behavior::STANDARD);
///     assert_eq!(descriptors[0].key.type_name(), "u16");
/// });
/// ```
#[derive(Debug, Clone)]
pub struct EntryDescriptor {
    /// The abstraction key
    pub key: Key,
    /// Stored entry variant
    pub kind: EntryKind,
    /// Behavior flags (`STANDARD` for undecorated entries)
    pub behavior: Behavior,
}
