//! # Managed Objects
//!
//! A value bound at construction to exactly one owning singleton instance.
//!
//! Reads are open to anyone holding a reference. Mutation requires
//! presenting the owner's [`Capability`]; a capability from any other
//! instance, including another singleton or a later instance of the same
//! class, is rejected with [`FolioError::NotManagedByOwner`].

use super::singleton::{Capability, InstanceId, Singleton};
use crate::types::{FolioError, FolioResult, short_type_name};
use std::ops::Deref;
use tracing::error;

/// A value only its owning manager may mutate.
#[derive(Debug)]
pub struct Managed<T> {
    value: T,
    owner: InstanceId,
    manager: &'static str,
    object: &'static str,
}

impl<T> Managed<T> {
    /// Bind `value` to the manager holding `manager`.
    #[must_use]
    pub fn new(value: T, manager: &Capability) -> Self {
        Self {
            value,
            owner: manager.instance(),
            manager: manager.class(),
            object: short_type_name::<T>(),
        }
    }

    /// Bind `value` to the live instance in `slot`, on behalf of `caller`.
    ///
    /// Fails with [`FolioError::ManagerNotASingleton`] if the slot is empty
    /// and with [`FolioError::NotManagedByOwner`] if `caller` is not the live
    /// instance.
    pub fn under<M>(slot: &Singleton<M>, caller: &Capability, value: T) -> FolioResult<Self> {
        let Some(owner) = slot.instance_id() else {
            return Err(FolioError::ManagerNotASingleton {
                manager: slot.name(),
            });
        };
        if caller.instance() != owner {
            let object = short_type_name::<T>();
            error!(
                object,
                caller = caller.class(),
                manager = slot.name(),
                "managed object constructed by non-manager"
            );
            return Err(FolioError::NotManagedByOwner {
                object,
                caller: caller.class(),
                manager: slot.name(),
            });
        }
        Ok(Self::new(value, caller))
    }

    /// Name of the owning manager class.
    #[must_use]
    pub fn manager(&self) -> &'static str {
        self.manager
    }

    /// Whether `caller` is the owning instance.
    #[must_use]
    pub fn is_managed_by(&self, caller: &Capability) -> bool {
        caller.instance() == self.owner
    }

    /// Verify that `caller` is the owning instance.
    pub fn verify(&self, caller: &Capability) -> FolioResult<()> {
        if self.is_managed_by(caller) {
            return Ok(());
        }
        error!(
            object = self.object,
            caller = caller.class(),
            manager = self.manager,
            "manager-only call from non-owner"
        );
        Err(FolioError::NotManagedByOwner {
            object: self.object,
            caller: caller.class(),
            manager: self.manager,
        })
    }

    /// Mutable access for the owner.
    pub fn get_mut(&mut self, caller: &Capability) -> FolioResult<&mut T> {
        self.verify(caller)?;
        Ok(&mut self.value)
    }

    /// Run `f` with mutable access, for the owner only.
    pub fn with<R>(&mut self, caller: &Capability, f: impl FnOnce(&mut T) -> R) -> FolioResult<R> {
        Ok(f(self.get_mut(caller)?))
    }

    /// Release the value, for the owner only.
    pub fn into_inner(self, caller: &Capability) -> FolioResult<T> {
        self.verify(caller)?;
        Ok(self.value)
    }
}

impl<T> Deref for Managed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

// =============================================================================
// TESTS
// =============================================================================
