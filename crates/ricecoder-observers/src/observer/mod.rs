//! Observer capability and handler bookkeeping
//!
//! A type becomes an observer by implementing [`Observer`] and binding its
//! handlers on the [`Registrar`] it is handed at registration time:
//!
//! ```ignore
//! use ricecoder_observers::{AfterEvent, HandlerResult, Observer, Registrar};
//!
//! struct AuditTrail;
//!
//! impl AuditTrail {
//!     fn on_saved(&self, event: &FileSaved) -> HandlerResult {
//!         tracing::info!(path = %event.path, "saved");
//!         Ok(())
//!     }
//!
//!     fn after_saved(&self, event: AfterEvent<'_, FileSaved>) -> HandlerResult {
//!         tracing::debug!(path = %event.path, "all save handlers ran");
//!         Ok(())
//!     }
//! }
//!
//! impl Observer for AuditTrail {
//!     fn observe(registrar: &mut Registrar<Self>) {
//!         registrar.on(Self::on_saved).after(Self::after_saved);
//!     }
//! }
//! ```

pub mod capability;
pub(crate) mod descriptor;
pub mod registrar;

pub use capability::ObserverCapability;
pub use registrar::Registrar;

use std::fmt;
use std::sync::Arc;

use crate::events::EventType;

/// A type whose instances can be registered with an [`ObserverManager`](crate::ObserverManager)
///
/// `observe` is called once per registration and must bind at least one
/// handler; an observer that binds nothing is rejected as "not an observer".
pub trait Observer: Send + Sync + 'static {
    /// Bind this type's handlers
    fn observe(registrar: &mut Registrar<Self>)
    where
        Self: Sized;
}

/// Delivery phase of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs before every plain handler of the event
    Before,
    /// Plain delivery
    Invoke,
    /// Runs after every plain handler of the event
    After,
}

impl Phase {
    /// All phases in delivery order
    pub const ALL: [Phase; 3] = [Phase::Before, Phase::Invoke, Phase::After];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Before => "before",
            Phase::Invoke => "invoke",
            Phase::After => "after",
        })
    }
}

/// Describes one bound handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    /// Type name of the observer
    pub observer: &'static str,
    /// Rust path of the handler function or closure
    pub handler: &'static str,
    pub phase: Phase,
    /// Event type the handler was bound for
    pub event_type: EventType,
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} {}]", self.handler, self.phase, self.event_type)
    }
}

/// Identity of a registered observer object
///
/// Two handles are the same observer iff they point at the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverKey(usize);

impl ObserverKey {
    pub fn of<T: ?Sized>(observer: &Arc<T>) -> Self {
        ObserverKey(Arc::as_ptr(observer) as *const () as usize)
    }
}
