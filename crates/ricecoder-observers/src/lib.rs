//! RiceCoder Observers
//!
//! Type-directed, in-process event dispatch. Components register as observers
//! of one or more event types; firing an event synchronously runs every handler
//! bound to the event's concrete type or to one of its ancestor types.
//!
//! # Architecture
//!
//! The system consists of five main components:
//!
//! 1. **Events** (`events`): the [`Event`] trait, [`EventType`] identity with
//!    its ancestor chain, the phase wrappers and the lifecycle events
//! 2. **Observers** (`observer`): the [`Observer`] capability and the
//!    [`Registrar`] handlers are bound on
//! 3. **Registry** (`registry`): registered observers in registration order
//! 4. **Resolver** (`resolver`): per event type, the composed handlers, cached
//!    until the registry changes
//! 5. **Dispatcher** (`dispatcher`): the [`ObserverManager`] entry point
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ricecoder_observers::{
//!     impl_event, BeforeEvent, HandlerResult, Observer, ObserverManager, Registrar,
//! };
//!
//! #[derive(Debug)]
//! struct FileSaved {
//!     path: String,
//! }
//!
//! #[derive(Debug)]
//! struct ConfigSaved {
//!     file: FileSaved,
//! }
//!
//! impl_event!(FileSaved);
//! impl_event!(ConfigSaved: FileSaved => file);
//!
//! struct Formatter;
//!
//! impl Formatter {
//!     fn before_save(&self, event: BeforeEvent<'_, FileSaved>) -> HandlerResult {
//!         tracing::debug!(path = %event.path, "about to format");
//!         Ok(())
//!     }
//!
//!     fn on_save(&self, event: &FileSaved) -> HandlerResult {
//!         anyhow::ensure!(!event.path.is_empty(), "empty path");
//!         Ok(())
//!     }
//! }
//!
//! impl Observer for Formatter {
//!     fn observe(registrar: &mut Registrar<Self>) {
//!         registrar.before(Self::before_save).on(Self::on_save);
//!     }
//! }
//!
//! let manager = ObserverManager::new();
//! manager.add_observer(Arc::new(Formatter))?;
//!
//! // Reaches both handlers: ConfigSaved extends FileSaved
//! manager.fire(Arc::new(ConfigSaved {
//!     file: FileSaved { path: "ricecoder.yaml".to_string() },
//! }));
//! # Ok::<(), ricecoder_observers::ObserverError>(())
//! ```
//!
//! # Phases
//!
//! Every fire runs BEFORE handlers, then plain handlers, then AFTER handlers.
//! Within a phase, handlers run in observer registration order. AFTER handlers
//! run even when a plain handler failed.
//!
//! # Error Handling
//!
//! Registration returns `Result<T>`, an alias for
//! `std::result::Result<T, ObserverError>`. Handler failures never reach the
//! caller of `fire`: they are fired as [`ObserverFailed`] events and logged
//! with `tracing`.
//!
//! # Thread Safety
//!
//! [`ObserverManager`] is `Send + Sync`. No lock is held while a handler runs,
//! so handlers may fire events and add or remove observers.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub(crate) mod invocation;
pub mod observer;
pub(crate) mod registry;
pub(crate) mod resolver;

// Re-export public types
pub use config::{ConfigLoader, ManagerConfig};
pub use dispatcher::{EventDispatcher, ObserverManager};
pub use error::{HandlerResult, InvocationError, ObserverError, Result, Violation};
pub use events::lifecycle::ObserverHandle;
pub use events::{
    AfterEvent, Ancestry, BeforeEvent, Event, EventIdentity, EventType, ObserverAdded,
    ObserverFailed, ObserverRemoved,
};
pub use observer::{HandlerDescriptor, Observer, ObserverCapability, ObserverKey, Phase, Registrar};

#[doc(hidden)]
pub use inventory;
