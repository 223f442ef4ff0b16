//! The process-wide default registry.

use once_cell::sync::Lazy;

use crate::registry::Registry;

// The one shared default instance, created on first access and alive for
// the rest of the process. Entries are removed only by clear() or
// overwrite, as with any registry.
static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Returns the process-wide default registry.
///
/// The instance is created lazily on first access and never torn down;
/// callers who want an owned lifetime should construct their own
/// [`Registry`] and pass it to call sites instead.
///
/// # Examples
///
/// ```rust
/// use bindery::global;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     global().register_instance(0x4du8).await;
///     let value = global().get::<u8>().await.unwrap();
///     assert_eq!(*value, 0x4d);
///     global().clear().await;
/// });
/// ```
pub fn global() -> &'static Registry {
    &GLOBAL
}
