//! Registry of observer descriptors
//!
//! Holds one [`ObserverDescriptor`] per registered observer object, in
//! registration order. Every mutation runs a caller-supplied hook while the
//! write lock is still held, which lets the manager drop its resolved
//! invocations before any reader can observe the new membership.

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::debug;

use crate::observer::descriptor::ObserverDescriptor;
use crate::observer::ObserverKey;

/// Ordered, thread-safe set of registered observers
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: RwLock<Vec<ObserverDescriptor>>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `descriptor` unless its observer is already present
    ///
    /// Returns whether the registry changed. `on_change` runs under the write
    /// lock, only when it did.
    pub(crate) fn insert(&self, descriptor: ObserverDescriptor, on_change: impl FnOnce()) -> bool {
        let mut observers = self.observers.write();
        if observers.iter().any(|d| d.key() == descriptor.key()) {
            debug!(
                observer = descriptor.observer_type(),
                "Observer already registered"
            );
            return false;
        }

        debug!(observer = descriptor.observer_type(), "Registering observer");
        observers.push(descriptor);
        on_change();
        true
    }

    /// Remove the observer identified by `key`
    ///
    /// `on_change` runs under the write lock, only when something was removed.
    pub(crate) fn remove(
        &self,
        key: ObserverKey,
        on_change: impl FnOnce(),
    ) -> Option<ObserverDescriptor> {
        let mut observers = self.observers.write();
        let index = observers.iter().position(|d| d.key() == key)?;

        let descriptor = observers.remove(index);
        debug!(observer = descriptor.observer_type(), "Unregistered observer");
        on_change();
        Some(descriptor)
    }

    /// Shared view of the observers, in registration order
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<ObserverDescriptor>> {
        self.observers.read()
    }

    pub(crate) fn contains(&self, key: ObserverKey) -> bool {
        self.observers.read().iter().any(|d| d.key() == key)
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.read().len()
    }
}
