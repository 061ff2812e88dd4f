//! Link-time registry of observer types
//!
//! [`ObserverManager::add_component`](crate::ObserverManager::add_component)
//! accepts type-erased objects. Whether such an object observes anything is
//! decided by looking up its concrete type among the capabilities submitted
//! with [`register_observer!`](crate::register_observer):
//!
//! ```ignore
//! use ricecoder_observers::{register_observer, Observer, Registrar};
//!
//! struct DeploymentWatcher;
//!
//! impl Observer for DeploymentWatcher {
//!     fn observe(registrar: &mut Registrar<Self>) {
//!         registrar.on(Self::on_deployed);
//!     }
//! }
//!
//! register_observer!(DeploymentWatcher);
//! ```

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ObserverError, Result};
use crate::events::lifecycle::ObserverHandle;
use crate::observer::descriptor::ObserverDescriptor;
use crate::observer::Observer;

/// Type-erased constructor of observer descriptors for one observer type
pub struct ObserverCapability {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    describe: fn(ObserverHandle, usize) -> Result<ObserverDescriptor>,
}

impl ObserverCapability {
    /// Capability of observer type `O`
    pub const fn of<O: Observer>() -> Self {
        Self {
            type_id: TypeId::of::<O>,
            type_name: type_name::<O>,
            describe: describe::<O>,
        }
    }

    /// Concrete type this capability describes
    pub fn observer_type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn observer_type(&self) -> &'static str {
        (self.type_name)()
    }

    /// Capability submitted for the concrete type `type_id`, if any
    pub fn find(type_id: TypeId) -> Option<&'static ObserverCapability> {
        inventory::iter::<ObserverCapability>()
            .find(|capability| capability.observer_type_id() == type_id)
    }

    /// All submitted capabilities, in link order
    pub fn registered() -> impl Iterator<Item = &'static ObserverCapability> {
        inventory::iter::<ObserverCapability>()
    }

    pub(crate) fn describe(
        &self,
        component: ObserverHandle,
        max_depth: usize,
    ) -> Result<ObserverDescriptor> {
        (self.describe)(component, max_depth)
    }
}

impl fmt::Debug for ObserverCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverCapability")
            .field("observer_type", &self.observer_type())
            .finish()
    }
}

inventory::collect!(ObserverCapability);

fn describe<O: Observer>(component: ObserverHandle, max_depth: usize) -> Result<ObserverDescriptor> {
    let observer: Arc<O> = component
        .downcast::<O>()
        .map_err(|_| ObserverError::NotAnObserver {
            observer: type_name::<O>(),
        })?;

    debug!(observer = type_name::<O>(), "Describing component");
    ObserverDescriptor::build(observer, max_depth)
}

/// Make observer types discoverable by `ObserverManager::add_component`
///
/// ```ignore
/// register_observer!(AuditTrail, DeploymentWatcher);
/// ```
#[macro_export]
macro_rules! register_observer {
    ($($observer:ty),+ $(,)?) => {
        $(
            $crate::inventory::submit! {
                $crate::ObserverCapability::of::<$observer>()
            }
        )+
    };
}
