//! The observer manager
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use ricecoder_observers::{impl_event, HandlerResult, Observer, ObserverManager, Registrar};
//!
//! #[derive(Debug)]
//! struct Ping;
//! impl_event!(Ping);
//!
//! struct Pong;
//!
//! impl Pong {
//!     fn on_ping(&self, _: &Ping) -> HandlerResult {
//!         println!("pong");
//!         Ok(())
//!     }
//! }
//!
//! impl Observer for Pong {
//!     fn observe(registrar: &mut Registrar<Self>) {
//!         registrar.on(Self::on_ping);
//!     }
//! }
//!
//! let manager = ObserverManager::new();
//! assert!(manager.add_observer(Arc::new(Pong))?);
//! manager.fire(Arc::new(Ping));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::ManagerConfig;
use crate::dispatcher::{EventDispatcher, FireScope};
use crate::error::Result;
use crate::events::lifecycle::ObserverHandle;
use crate::events::{Event, ObserverAdded, ObserverRemoved};
use crate::observer::descriptor::ObserverDescriptor;
use crate::observer::{Observer, ObserverCapability, ObserverKey};
use crate::registry::ObserverRegistry;
use crate::resolver::InvocationResolver;

/// Registers observers and fires events at them
///
/// Thread-safe; share it behind an `Arc`. Handlers may call back into the
/// manager (fire, add, remove) while an event is being delivered.
pub struct ObserverManager {
    config: ManagerConfig,
    registry: ObserverRegistry,
    resolver: InvocationResolver,
}

impl ObserverManager {
    /// Create a manager with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(ManagerConfig::default())
    }

    /// Create a manager with `config`
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Config`](crate::ObserverError::Config) if the
    /// configuration is invalid.
    pub fn with_config(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ManagerConfig) -> Self {
        Self {
            config,
            registry: ObserverRegistry::new(),
            resolver: InvocationResolver::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Register `observer`
    ///
    /// Returns `Ok(true)` if it was added, `Ok(false)` if this exact object is
    /// already registered or binds no handlers. An [`ObserverAdded`] event is
    /// fired after a successful add.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::InvalidObserver`](crate::ObserverError::InvalidObserver)
    /// if one of its handlers breaks a registration rule.
    pub fn add_observer<O: Observer>(&self, observer: Arc<O>) -> Result<bool> {
        let built = ObserverDescriptor::build(observer, self.config.max_hierarchy_depth);
        self.admit(built)
    }

    /// Register a type-erased component if its type was announced with
    /// [`register_observer!`](crate::register_observer)
    ///
    /// Components of any other type are not observers and yield `Ok(false)`.
    pub fn add_component(&self, component: ObserverHandle) -> Result<bool> {
        let Some(capability) = ObserverCapability::find((*component).type_id()) else {
            debug!("Component type has no observer capability");
            return Ok(false);
        };

        let built = capability.describe(component, self.config.max_hierarchy_depth);
        self.admit(built)
    }

    fn admit(&self, built: Result<ObserverDescriptor>) -> Result<bool> {
        let descriptor = match built {
            Ok(descriptor) => descriptor,
            Err(e) if e.is_not_an_observer() => {
                debug!(error = %e, "Ignoring object that is not an observer");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let target = Arc::clone(descriptor.target());
        let observer_type = descriptor.observer_type();
        if !self
            .registry
            .insert(descriptor, || self.resolver.invalidate())
        {
            return Ok(false);
        }

        self.fire(Arc::new(ObserverAdded::new(target, observer_type)));
        Ok(true)
    }

    /// Unregister `observer`
    ///
    /// Returns `false` if this exact object was not registered. An
    /// [`ObserverRemoved`] event is fired after a successful removal.
    pub fn remove_observer<O: Observer>(&self, observer: &Arc<O>) -> bool {
        self.release(ObserverKey::of(observer))
    }

    /// Unregister a component added with [`add_component`](Self::add_component)
    pub fn remove_component(&self, component: &ObserverHandle) -> bool {
        self.release(ObserverKey::of(component))
    }

    fn release(&self, key: ObserverKey) -> bool {
        let Some(descriptor) = self.registry.remove(key, || self.resolver.invalidate()) else {
            return false;
        };

        self.fire(Arc::new(ObserverRemoved::new(
            Arc::clone(descriptor.target()),
            descriptor.observer_type(),
        )));
        true
    }

    /// Whether this exact object is registered
    pub fn is_registered<O: ?Sized>(&self, observer: &Arc<O>) -> bool {
        self.registry.contains(ObserverKey::of(observer))
    }

    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of event types with a resolved, cached invocation
    pub fn cached_types(&self) -> usize {
        self.resolver.len()
    }

    /// Deliver `event` to every handler bound to its type or an ancestor
    ///
    /// BEFORE handlers run first, then plain handlers, then AFTER handlers,
    /// each group in registration order. Handler failures are reported as
    /// [`ObserverFailed`](crate::ObserverFailed) events and never reach the
    /// caller. Returns `event` itself.
    pub fn fire<E: Event>(&self, event: Arc<E>) -> Arc<E> {
        let erased: Arc<dyn Event> = event.clone();
        self.fire_dyn(erased);
        event
    }

    /// [`fire`](Self::fire) for a type-erased event
    ///
    /// Called from a handler on the same thread, this joins the running fire:
    /// handlers that already failed in it are not reported again.
    pub fn fire_dyn(&self, event: Arc<dyn Event>) -> Arc<dyn Event> {
        let scope = FireScope::enter(self);
        self.dispatch(Arc::clone(&event), &scope);
        event
    }

    pub(crate) fn dispatch(&self, event: Arc<dyn Event>, scope: &FireScope<'_>) {
        let event_type = event.event_type();
        let invocation =
            self.resolver
                .resolve(&self.registry, event_type, self.config.max_hierarchy_depth);

        debug!(event = %event_type, "Dispatching event");
        invocation.invoke(&event, scope);
    }
}

impl Default for ObserverManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher for ObserverManager {
    fn dispatch_event(&self, event: Arc<dyn Event>) {
        self.fire_dyn(event);
    }
}

impl fmt::Debug for ObserverManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverManager")
            .field("config", &self.config)
            .field("observers", &self.observer_count())
            .field("cached_types", &self.cached_types())
            .finish()
    }
}
