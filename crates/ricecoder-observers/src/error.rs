//! Error types for the observer system
//!
//! Two families of errors exist and they travel on different channels:
//!
//! 1. **Registration errors** ([`ObserverError`]): returned to whoever calls
//!    [`ObserverManager::add_observer`](crate::ObserverManager::add_observer).
//!    `NotAnObserver` is swallowed by the manager and turned into `Ok(false)`;
//!    `InvalidObserver` is a programming error and is always surfaced.
//!
//! 2. **Invocation errors** ([`InvocationError`]): produced while a handler runs.
//!    They never reach the caller of `fire`. Logic failures are reported through
//!    an [`ObserverFailed`](crate::ObserverFailed) event and logged; mechanical
//!    failures are only logged.
//!
//! # Examples
//!
//! ```ignore
//! match manager.add_observer(Arc::new(AuditTrail::default())) {
//!     Ok(true) => println!("registered"),
//!     Ok(false) => println!("already registered or not an observer"),
//!     Err(ObserverError::InvalidObserver { handler, violation, .. }) => {
//!         panic!("fix {}: {}", handler, violation)
//!     }
//!     Err(e) => panic!("{}", e),
//! }
//! ```

use thiserror::Error;

use crate::events::EventType;
use crate::observer::Phase;

/// Errors that can occur while registering observers or loading configuration
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The object binds no handlers at all
    ///
    /// Swallowed by `add_observer`/`remove_observer`, which report `false` instead,
    /// so wiring code can probe arbitrary components.
    #[error("{observer} binds no observer handlers; bind at least one in Observer::observe, e.g. registrar.on(Self::on_ping)")]
    NotAnObserver {
        /// Type name of the rejected object
        observer: &'static str,
    },

    /// A bound handler violates a registration rule
    ///
    /// Aborts the registration. The message names the observer, the handler and
    /// the rule that was broken.
    #[error("invalid observer handler {handler} on {observer}: {violation}")]
    InvalidObserver {
        /// Type name of the observer
        observer: &'static str,
        /// Rust path of the offending handler
        handler: &'static str,
        /// The broken rule
        violation: Violation,
    },

    /// Configuration is structurally valid but semantically wrong
    #[error("Invalid observer configuration: {0}")]
    Config(String),

    /// Configuration could not be parsed
    #[error("Serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObserverError {
    /// Whether this error only means "the object does not observe anything"
    pub fn is_not_an_observer(&self) -> bool {
        matches!(self, ObserverError::NotAnObserver { .. })
    }
}

/// Registration rule broken by a handler binding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Two handlers of one observer claim the same phase and event type
    #[error("{phase} handler for {event_type} is already bound by {previous}")]
    DuplicateHandler {
        phase: Phase,
        event_type: EventType,
        previous: &'static str,
    },

    /// The event type's ancestor chain never reaches a root
    #[error("ancestor chain of {event_type} exceeds {max_depth} levels (cyclic parent declaration?)")]
    UnresolvableEventType {
        event_type: EventType,
        max_depth: usize,
    },
}

/// Failure of a single bound handler call
///
/// Carried by [`ObserverFailed`](crate::ObserverFailed) and written to the log.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The handler returned an error
    #[error("{0:#}")]
    Handler(anyhow::Error),

    /// The handler panicked
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// The event value does not expose the type the handler is bound to
    ///
    /// Happens when an event's `parent_event` chain disagrees with its
    /// `parent_type` declaration. Not the observer's fault, so it is logged
    /// but never reported as `ObserverFailed`.
    #[error("event {actual} does not expose a {expected} value")]
    EventMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl InvocationError {
    /// Whether the failure comes from dispatch mechanics rather than observer logic
    pub fn is_mechanical(&self) -> bool {
        matches!(self, InvocationError::EventMismatch { .. })
    }
}

/// Result type for observer operations
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Result type returned by observer handlers
pub type HandlerResult = anyhow::Result<()>;
