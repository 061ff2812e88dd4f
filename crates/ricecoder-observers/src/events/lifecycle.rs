//! Lifecycle events emitted by the observer manager itself
//!
//! - [`ObserverAdded`] after an observer joined the registry
//! - [`ObserverRemoved`] after an observer left the registry
//! - [`ObserverFailed`] when a handler failed while processing an event
//!
//! They are fired through the same manager, so any observer can watch them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::InvocationError;
use crate::events::Event;
use crate::observer::{HandlerDescriptor, ObserverKey};

/// Type-erased handle to a registered observer object
pub type ObserverHandle = Arc<dyn Any + Send + Sync>;

fn downcast_handle<O: Any + Send + Sync>(handle: &ObserverHandle) -> Option<Arc<O>> {
    Arc::clone(handle).downcast::<O>().ok()
}

macro_rules! membership_event {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            observer: ObserverHandle,
            observer_type: &'static str,
        }

        impl $name {
            pub(crate) fn new(observer: ObserverHandle, observer_type: &'static str) -> Self {
                Self {
                    observer,
                    observer_type,
                }
            }

            /// The observer object
            pub fn observer(&self) -> &ObserverHandle {
                &self.observer
            }

            /// Type name of the observer object
            pub fn observer_type(&self) -> &'static str {
                self.observer_type
            }

            /// The observer object as `O`, if it is one
            pub fn observer_as<O: Any + Send + Sync>(&self) -> Option<Arc<O>> {
                downcast_handle(&self.observer)
            }

            /// Whether this event concerns exactly `observer`
            pub fn concerns<O: ?Sized>(&self, observer: &Arc<O>) -> bool {
                ObserverKey::of(&self.observer) == ObserverKey::of(observer)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("observer", &self.observer_type)
                    .finish()
            }
        }

        impl Event for $name {}
    };
}

membership_event!(
    /// An observer was registered
    ObserverAdded
);

membership_event!(
    /// An observer was unregistered
    ObserverRemoved
);

/// A handler failed while processing an event
///
/// Fired at most once per failing handler within one outer `fire` call, and
/// never for failures that happen while an `ObserverFailed` is being delivered.
pub struct ObserverFailed {
    observer: ObserverHandle,
    handler: HandlerDescriptor,
    event: Arc<dyn Event>,
    cause: Arc<InvocationError>,
}

impl ObserverFailed {
    pub(crate) fn new(
        observer: ObserverHandle,
        handler: HandlerDescriptor,
        event: Arc<dyn Event>,
        cause: Arc<InvocationError>,
    ) -> Self {
        Self {
            observer,
            handler,
            event,
            cause,
        }
    }

    /// The observer whose handler failed
    pub fn observer(&self) -> &ObserverHandle {
        &self.observer
    }

    /// The observer as `O`, if it is one
    pub fn observer_as<O: Any + Send + Sync>(&self) -> Option<Arc<O>> {
        downcast_handle(&self.observer)
    }

    /// The handler that failed
    pub fn handler(&self) -> &HandlerDescriptor {
        &self.handler
    }

    /// The event the handler was processing
    pub fn event(&self) -> &Arc<dyn Event> {
        &self.event
    }

    /// Why the handler failed
    pub fn cause(&self) -> &InvocationError {
        &self.cause
    }
}

impl fmt::Debug for ObserverFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverFailed")
            .field("handler", &self.handler)
            .field("event", &self.event)
            .field("cause", &self.cause)
            .finish()
    }
}

impl Event for ObserverFailed {}
