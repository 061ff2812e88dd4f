//! Event dispatch
//!
//! [`ObserverManager`] owns the observer registry and the resolution cache and
//! delivers fired events to every matching handler. Dispatch is synchronous:
//! `fire` returns once every handler has run.

pub mod manager;
pub(crate) mod scope;

pub use manager::ObserverManager;
pub(crate) use scope::FireScope;

use std::sync::Arc;

use crate::events::Event;

/// Something that type-erased events can be handed to
///
/// Lets components that only need to fire events hold an
/// `Arc<dyn EventDispatcher>` instead of the full manager.
///
/// # Examples
///
/// ```ignore
/// fn announce(dispatcher: &dyn EventDispatcher) {
///     dispatcher.dispatch_event(Arc::new(DeploymentStarted { id: 7 }));
/// }
/// ```
pub trait EventDispatcher: Send + Sync {
    /// Deliver `event` to every matching handler
    ///
    /// Handler failures never come back to the caller; they are reported as
    /// [`ObserverFailed`](crate::ObserverFailed) events and logged.
    fn dispatch_event(&self, event: Arc<dyn Event>);
}
