//! Executable units produced by resolution
//!
//! An [`Invocation`] consumes one event and returns nothing. Resolution builds
//! one per concrete event type out of the bound handlers of every observer:
//!
//! - `Ignore`: nothing observes the event
//! - `Call`: exactly one handler; BEFORE/AFTER handlers wrap the event in
//!   their phase type before calling
//! - `List`: several handlers of one phase, in registration order
//! - `Sequence`: BEFORE, then INVOKE, then AFTER, always all three

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, warn};

use crate::dispatcher::FireScope;
use crate::error::InvocationError;
use crate::events::lifecycle::ObserverHandle;
use crate::events::{Event, ObserverFailed};
use crate::observer::HandlerDescriptor;

static NEXT_INVOCATION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) type EventCall =
    Box<dyn Fn(&dyn Event) -> std::result::Result<(), InvocationError> + Send + Sync>;

/// One handler bound to one observer object
pub(crate) struct MethodInvocation {
    id: u64,
    handler: HandlerDescriptor,
    observer: ObserverHandle,
    call: EventCall,
}

impl MethodInvocation {
    pub(crate) fn new(handler: HandlerDescriptor, observer: ObserverHandle, call: EventCall) -> Self {
        Self {
            id: NEXT_INVOCATION_ID.fetch_add(1, Ordering::Relaxed),
            handler,
            observer,
            call,
        }
    }

    pub(crate) fn handler(&self) -> &HandlerDescriptor {
        &self.handler
    }

    /// Run the handler; failures are reported, never returned
    pub(crate) fn invoke(&self, event: &Arc<dyn Event>, scope: &FireScope<'_>) {
        let error = match self.call_contained(event.as_ref(), scope.catch_panics()) {
            Ok(()) => return,
            Err(error) => error,
        };

        // A handler that already failed in this outer call stays silent
        if !scope.record_failure(self.id) {
            return;
        }

        if error.is_mechanical() {
            warn!(
                observer = self.handler.observer,
                handler = %self.handler,
                event = %event.event_type(),
                error = %error,
                "Could not deliver event to observer"
            );
            return;
        }

        let cause = Arc::new(error);
        if !scope.is_failure_report(event.as_ref()) {
            scope.dispatch(Arc::new(ObserverFailed::new(
                Arc::clone(&self.observer),
                self.handler.clone(),
                Arc::clone(event),
                Arc::clone(&cause),
            )));
        }

        error!(
            observer = self.handler.observer,
            handler = %self.handler,
            event = %event.event_type(),
            error = %cause,
            "Error invoking observer"
        );
    }

    fn call_contained(
        &self,
        event: &dyn Event,
        catch_panics: bool,
    ) -> std::result::Result<(), InvocationError> {
        if !catch_panics {
            return (self.call)(event);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| (self.call)(event))) {
            Ok(result) => result,
            Err(payload) => Err(InvocationError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl fmt::Debug for MethodInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.handler)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Composed delivery plan for one event type
#[derive(Debug, Clone)]
pub(crate) enum Invocation {
    Ignore,
    Call(Arc<MethodInvocation>),
    List(Vec<Arc<MethodInvocation>>),
    Sequence {
        before: Box<Invocation>,
        invoke: Box<Invocation>,
        after: Box<Invocation>,
    },
}

impl Invocation {
    /// Compose the handlers of one phase
    pub(crate) fn collect(mut calls: Vec<Arc<MethodInvocation>>) -> Self {
        match calls.len() {
            0 => Invocation::Ignore,
            1 => Invocation::Call(calls.remove(0)),
            _ => Invocation::List(calls),
        }
    }

    /// Compose the three phases
    pub(crate) fn phased(before: Invocation, invoke: Invocation, after: Invocation) -> Self {
        if before.is_ignore() && after.is_ignore() {
            invoke
        } else {
            Invocation::Sequence {
                before: Box::new(before),
                invoke: Box::new(invoke),
                after: Box::new(after),
            }
        }
    }

    pub(crate) fn is_ignore(&self) -> bool {
        matches!(self, Invocation::Ignore)
    }

    pub(crate) fn invoke(&self, event: &Arc<dyn Event>, scope: &FireScope<'_>) {
        match self {
            Invocation::Ignore => {}
            Invocation::Call(call) => call.invoke(event, scope),
            Invocation::List(calls) => {
                for call in calls {
                    call.invoke(event, scope);
                }
            }
            Invocation::Sequence {
                before,
                invoke,
                after,
            } => {
                before.invoke(event, scope);
                invoke.invoke(event, scope);
                after.invoke(event, scope);
            }
        }
    }

    /// Handlers in the order they would run
    pub(crate) fn handlers(&self) -> Vec<&HandlerDescriptor> {
        match self {
            Invocation::Ignore => Vec::new(),
            Invocation::Call(call) => vec![call.handler()],
            Invocation::List(calls) => calls.iter().map(|call| call.handler()).collect(),
            Invocation::Sequence {
                before,
                invoke,
                after,
            } => {
                let mut handlers = before.handlers();
                handlers.extend(invoke.handlers());
                handlers.extend(after.handlers());
                handlers
            }
        }
    }
}
