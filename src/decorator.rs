//! The behavior decorator: validation at registration, and the resolution
//! protocol for decorated entries.
//!
//! Resolution keeps construction outside any lock: a decorated entry's
//! target is read in shared mode, the candidate value is computed unlocked
//! (several first-time callers may each compute one), and only lazy
//! publication takes the entry's write lock, re-checking the target so
//! that exactly one candidate is ever published.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::behavior::Behavior;
use crate::descriptor::{AnyArc, ArgBox, TypeDescriptor};
use crate::entry::{DecoratedEntry, Entry, Target};
use crate::error::{RegistryError, RegistryResult};

/// Initializer applied to a resolution's result, type-erased.
pub(crate) type InitFn = dyn Fn(&AnyArc) + Send + Sync;

/// Wraps a type descriptor according to the requested behavior flags,
/// validating the combination.
///
/// Runs once, at registration. A `CreateMethod` request against a
/// descriptor with no factory route is a configuration error; nothing is
/// stored. Standard behavior stays undecorated.
pub(crate) fn decorate(descriptor: TypeDescriptor, behavior: Behavior) -> RegistryResult<Entry> {
    if behavior.contains(Behavior::CREATE_METHOD) && !descriptor.has_factory() {
        return Err(RegistryError::Configuration(
            descriptor.type_name(),
            "CreateMethod behavior requires a registered factory",
        ));
    }
    if behavior.is_empty() {
        return Ok(Entry::Type(descriptor));
    }
    Ok(Entry::Decorated(Arc::new(DecoratedEntry {
        behavior,
        type_name: descriptor.type_name(),
        target: tokio::sync::RwLock::new(Target::Descriptor(descriptor)),
    })))
}

/// Resolves a decorated entry.
///
/// The initializer, when supplied, runs exactly once per call: after the
/// cached value is read, after a transient candidate is computed, or under
/// the entry write lock at lazy publication.
pub(crate) async fn resolve(
    entry: &DecoratedEntry,
    args: Option<ArgBox>,
    init: Option<&InitFn>,
) -> RegistryResult<AnyArc> {
    // Shared mode: concurrent resolutions of this entry proceed together.
    let descriptor = {
        let target = entry.target.read().await;
        match &*target {
            Target::Resolved(value) => {
                let value = value.clone();
                drop(target);
                if let Some(init) = init {
                    init(&value);
                }
                return Ok(value);
            }
            Target::Descriptor(descriptor) => descriptor.clone(),
        }
    };

    // Compute the candidate without holding the entry lock. Racing callers
    // may each construct one; at most one gets published below.
    let candidate = if entry.behavior.contains(Behavior::CREATE_METHOD) {
        descriptor.create(args).await?
    } else {
        descriptor.construct(args)?
    };

    if !entry.behavior.contains(Behavior::LAZY_SINGLETON) {
        if let Some(init) = init {
            init(&candidate);
        }
        return Ok(candidate);
    }

    // Escalate to exclusive and re-check: a racer may have published while
    // this call was constructing.
    let mut target = entry.target.write().await;
    match &*target {
        Target::Descriptor(_) => {
            *target = Target::Resolved(candidate.clone());
            if let Some(init) = init {
                init(&candidate);
            }
            drop(target);
            debug!(type_name = entry.type_name, "published lazy singleton");
            Ok(candidate)
        }
        Target::Resolved(published) => {
            let published = published.clone();
            drop(target);
            trace!(
                type_name = entry.type_name,
                "discarding candidate, lazy singleton already published"
            );
            if let Some(init) = init {
                init(&published);
            }
            Ok(published)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NoArgs;

    struct Service(u32);

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(|_: NoArgs| Service(1))
    }

    #[test]
    fn standard_behavior_stays_undecorated() {
        let entry = decorate(descriptor(), Behavior::STANDARD).unwrap();
        assert!(matches!(entry, Entry::Type(_)));
    }

    #[test]
    fn lazy_singleton_wraps_descriptor() {
        let entry = decorate(descriptor(), Behavior::LAZY_SINGLETON).unwrap();
        assert!(matches!(entry, Entry::Decorated(_)));
    }

    #[test]
    fn create_method_without_factory_is_rejected() {
        let err = decorate(descriptor(), Behavior::CREATE_METHOD).unwrap_err();
        assert!(matches!(err, RegistryError::Configuration(_, _)));
    }

    #[test]
    fn create_method_with_factory_is_accepted() {
        let desc = descriptor().with_factory(|_: NoArgs| async { Ok(Service(2)) });
        let entry = decorate(desc, Behavior::CREATE_METHOD | Behavior::LAZY_SINGLETON).unwrap();
        assert!(matches!(entry, Entry::Decorated(_)));
    }

    #[tokio::test]
    async fn lazy_target_transitions_once() {
        let Entry::Decorated(entry) = decorate(descriptor(), Behavior::LAZY_SINGLETON).unwrap()
        else {
            unreachable!()
        };

        let first = resolve(&entry, None, None).await.unwrap();
        let second = resolve(&entry, None, None).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(&*entry.target.read().await, Target::Resolved(_)));
    }
}
