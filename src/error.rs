//! Error types for the provider registry.

use std::fmt;

/// Registry errors.
///
/// Represents the error conditions that can occur during provider
/// registration or resolution.
///
/// # Examples
///
/// ```rust
/// use bindery::{Registry, RegistryError};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let registry = Registry::new();
///     match registry.get::<String>().await {
///         Err(RegistryError::NotRegistered(type_name)) => {
///             assert_eq!(type_name, "alloc::string::String");
///         }
///         _ => unreachable!(),
///     }
/// });
/// ```
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// Registration-time misconfiguration: incompatible behavior/provider
    /// combination, or a missing factory route. Nothing is written to the
    /// registry when this is returned.
    Configuration(&'static str, &'static str),
    /// Key not registered and no fallback was supplied
    NotRegistered(&'static str),
    /// Constructor or factory invocation failed, or the supplied argument
    /// value had the wrong type
    Construction {
        /// The type being constructed
        type_name: &'static str,
        /// What went wrong
        message: String,
    },
    /// Decorator reached with neither a type descriptor nor a resolved
    /// value. Indicates an implementation bug, not a caller mistake.
    InvalidDecoratorState(&'static str),
    /// Resolution abandoned on a cancellation signal before construction
    /// began
    Cancelled(&'static str),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Configuration(name, detail) => {
                write!(f, "Invalid registration for {}: {}", name, detail)
            }
            RegistryError::NotRegistered(name) => write!(f, "Not registered: {}", name),
            RegistryError::Construction { type_name, message } => {
                write!(f, "Failed to construct {}: {}", type_name, message)
            }
            RegistryError::InvalidDecoratorState(name) => {
                write!(f, "Invalid decorator state for {} (registry bug)", name)
            }
            RegistryError::Cancelled(name) => write!(f, "Resolution of {} cancelled", name),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
