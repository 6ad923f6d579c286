//! # Singletons
//!
//! An owned slot holding at most one live instance of a type.
//!
//! Slots are plain values owned by whoever drives the lifecycle (the
//! pipeline, for the built-in managers) and passed by reference; there is no
//! global registry. Construction while an instance is live fails; `reset`
//! empties the slot and permits the next construction.
//!
//! Every successful construction mints a [`Capability`] for the new instance.
//! The capability is the only proof of being that instance: it cannot be
//! cloned or built outside this module, it is moved into the constructor,
//! and the slot never hands it out again. It is what
//! [`Managed`](super::Managed) checks before allowing mutation.

use crate::types::{FolioError, FolioResult, short_type_name};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one singleton instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Unforgeable proof of being a specific live singleton instance.
#[derive(Debug, PartialEq, Eq)]
pub struct Capability {
    instance: InstanceId,
    class: &'static str,
}

impl Capability {
    fn mint(class: &'static str) -> Self {
        Self {
            instance: InstanceId::next(),
            class,
        }
    }

    /// Instance this capability belongs to.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Class name of the owning singleton.
    #[must_use]
    pub fn class(&self) -> &'static str {
        self.class
    }
}

/// Slot holding at most one live instance of `T`.
#[derive(Debug)]
pub struct Singleton<T> {
    name: &'static str,
    live: Option<(InstanceId, T)>,
    constructions: u64,
}

impl<T> Default for Singleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Singleton<T> {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: short_type_name::<T>(),
            live: None,
            constructions: 0,
        }
    }

    /// Name of the singleton class.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether an instance is live.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.live.is_some()
    }

    /// Construct the instance, handing the constructor its capability.
    ///
    /// Fails with [`FolioError::AlreadyInitialized`] while an instance is
    /// live. If `construct` fails the slot stays empty.
    pub fn init_with<F>(&mut self, construct: F) -> FolioResult<&mut T>
    where
        F: FnOnce(Capability) -> FolioResult<T>,
    {
        if let Some((instance, _)) = &self.live {
            error!(
                singleton = self.name,
                instance = instance.value(),
                "singleton constructed while an instance is live"
            );
            return Err(FolioError::AlreadyInitialized {
                singleton: self.name,
            });
        }

        let capability = Capability::mint(self.name);
        let instance = capability.instance;
        let value = construct(capability)?;

        self.constructions = self.constructions.saturating_add(1);
        debug!(
            singleton = self.name,
            instance = instance.value(),
            "singleton initialized"
        );
        let (_, value) = self.live.insert((instance, value));
        Ok(value)
    }

    /// Construct the instance from a ready value.
    ///
    /// The minted capability is dropped, so the instance cannot own managed
    /// objects. Use [`Singleton::init_with`] for managers.
    pub fn init(&mut self, value: T) -> FolioResult<&mut T> {
        self.init_with(|_| Ok(value))
    }

    /// The live instance.
    pub fn instance(&self) -> FolioResult<&T> {
        self.live
            .as_ref()
            .map(|(_, value)| value)
            .ok_or(FolioError::Uninitialized {
                singleton: self.name,
            })
    }

    /// The live instance, mutably.
    pub fn instance_mut(&mut self) -> FolioResult<&mut T> {
        self.live
            .as_mut()
            .map(|(_, value)| value)
            .ok_or(FolioError::Uninitialized {
                singleton: self.name,
            })
    }

    /// Identifier of the live instance, if any.
    #[must_use]
    pub fn instance_id(&self) -> Option<InstanceId> {
        self.live.as_ref().map(|(id, _)| *id)
    }

    /// How many instances this slot has constructed so far.
    #[must_use]
    pub fn constructions(&self) -> u64 {
        self.constructions
    }

    /// Drop the live instance, returning it. Afterwards `init` may succeed again.
    pub fn reset(&mut self) -> Option<T> {
        let previous = self.live.take();
        if let Some((instance, _)) = &previous {
            debug!(
                singleton = self.name,
                instance = instance.value(),
                "singleton reset"
            );
        }
        previous.map(|(_, value)| value)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Config {
        name: &'static str,
    }

    #[test]
    fn instance_before_init_fails() {
        let slot: Singleton<Config> = Singleton::new();
        assert!(!slot.initialized());
        assert_eq!(
            slot.instance(),
            Err(FolioError::Uninitialized { singleton: "Config" })
        );
    }

    #[test]
    fn second_construction_fails_until_reset() {
        let mut slot = Singleton::new();
        slot.init(Config { name: "first" }).expect("first");

        assert_eq!(
            slot.init(Config { name: "second" }).map(|c| c.name),
            Err(FolioError::AlreadyInitialized { singleton: "Config" })
        );
        assert_eq!(slot.instance().expect("live").name, "first");

        assert_eq!(slot.reset(), Some(Config { name: "first" }));
        assert!(!slot.initialized());

        slot.init(Config { name: "third" }).expect("after reset");
        assert_eq!(slot.instance().expect("live").name, "third");
        assert_eq!(slot.constructions(), 2);
    }

    #[test]
    fn failed_constructor_leaves_slot_empty() {
        let mut slot: Singleton<Config> = Singleton::new();
        let result = slot.init_with(|_| Err(FolioError::aborted("Config", "bad")));

        assert!(result.is_err());
        assert!(!slot.initialized());
        slot.init(Config { name: "ok" }).expect("retry");
    }

    #[test]
    fn each_construction_mints_a_new_instance() {
        let mut slot = Singleton::new();
        let mut minted = Vec::new();

        slot.init_with(|capability| {
            minted.push((capability.instance(), capability.class()));
            Ok(Config { name: "first" })
        })
        .expect("first");
        let first = slot.instance_id().expect("id");
        assert_eq!(minted, vec![(first, "Config")]);

        slot.reset();
        assert_eq!(slot.instance_id(), None);

        slot.init_with(|capability| {
            minted.push((capability.instance(), capability.class()));
            Ok(Config { name: "second" })
        })
        .expect("second");
        let second = slot.instance_id().expect("id");
        assert_ne!(second, first);
        assert_eq!(minted[1], (second, "Config"));
    }
}
