//! Abstraction keys for registry storage and lookup.

use std::any::TypeId;
use std::fmt;

/// Key under which a provider is registered and later resolved.
///
/// Keys are built from the abstraction's Rust type: the `TypeId` drives
/// lookup while the type name is carried for diagnostics and error
/// messages. Keys are unique within a registry; registering again under
/// the same key overwrites the prior entry.
///
/// # Examples
///
/// ```rust
/// use bindery::Key;
///
/// let a = Key::of::<String>();
/// let b = Key::of::<String>();
/// assert_eq!(a, b);
/// assert_eq!(a.type_name(), "alloc::string::String");
///
/// assert_ne!(Key::of::<u32>(), Key::of::<u64>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    type_id: TypeId,
    type_name: &'static str,
}

impl Key {
    /// Builds the key for abstraction type `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Human-readable type name for display.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// Hot path: TypeId-only comparison, the name is diagnostics-only.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
