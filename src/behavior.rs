//! Instantiation behavior flags.

use bitflags::bitflags;

bitflags! {
    /// Behavior flags controlling how a registered type provider is
    /// instantiated.
    ///
    /// The empty set is standard behavior: construct a fresh instance on
    /// every resolution through the registered constructor. Flags can be
    /// combined; `LAZY_SINGLETON | CREATE_METHOD` builds once through the
    /// factory route and caches the result for all later resolutions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindery::Behavior;
    ///
    /// let standard = Behavior::STANDARD;
    /// assert!(standard.is_empty());
    ///
    /// let lazy_factory = Behavior::LAZY_SINGLETON | Behavior::CREATE_METHOD;
    /// assert!(lazy_factory.contains(Behavior::LAZY_SINGLETON));
    /// assert!(lazy_factory.contains(Behavior::CREATE_METHOD));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Behavior: u8 {
        /// Cache the first resolution; every later resolution returns the
        /// same instance and never re-runs construction.
        const LAZY_SINGLETON = 1 << 0;
        /// Route construction through the registered factory instead of
        /// the constructor. The factory may be asynchronous.
        const CREATE_METHOD = 1 << 1;
    }
}

impl Behavior {
    /// No decoration: fresh construction per resolution.
    pub const STANDARD: Behavior = Behavior::empty();
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior::STANDARD
    }
}
