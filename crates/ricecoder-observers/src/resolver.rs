//! Per-type resolution of invocations
//!
//! The first `fire` of a concrete event type asks every registered observer,
//! in registration order, for its most specific handler in each phase and
//! composes the answers into one [`Invocation`]. The result is memoized until
//! the registry changes.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::events::EventType;
use crate::invocation::Invocation;
use crate::observer::descriptor::ObserverDescriptor;
use crate::observer::Phase;
use crate::registry::ObserverRegistry;

/// Memoized invocations keyed by concrete event type
#[derive(Default)]
pub(crate) struct InvocationResolver {
    cache: DashMap<TypeId, Arc<Invocation>>,
}

impl InvocationResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Invocation for events whose concrete type is `event_type`
    pub(crate) fn resolve(
        &self,
        registry: &ObserverRegistry,
        event_type: EventType,
        max_depth: usize,
    ) -> Arc<Invocation> {
        if let Some(cached) = self.cache.get(&event_type.id()) {
            return Arc::clone(cached.value());
        }

        // Publish while the read lock is held so a concurrent add/remove
        // cannot clear the cache between build and insert
        let observers = registry.read();
        let invocation = Arc::new(Self::build(&observers, event_type, max_depth));
        self.cache.insert(event_type.id(), Arc::clone(&invocation));
        drop(observers);

        invocation
    }

    /// Compose the invocation for `event_type` from `observers`
    pub(crate) fn build(
        observers: &[ObserverDescriptor],
        event_type: EventType,
        max_depth: usize,
    ) -> Invocation {
        let mut ancestry = event_type.ancestry(max_depth);
        ancestry.by_ref().for_each(drop);
        if ancestry.truncated() {
            warn!(
                event = %event_type,
                max_depth,
                "Ancestor chain exceeds the configured depth; handlers for deeper ancestors are skipped"
            );
        }

        let [before, invoke, after] = Phase::ALL.map(|phase| {
            Invocation::collect(
                observers
                    .iter()
                    .filter_map(|observer| observer.get(phase, event_type, max_depth))
                    .collect(),
            )
        });
        let invocation = Invocation::phased(before, invoke, after);

        debug!(
            event = %event_type,
            handlers = invocation.handlers().len(),
            "Resolved observers for event type"
        );

        invocation
    }

    /// Drop every memoized invocation
    pub(crate) fn invalidate(&self) {
        self.cache.clear();
    }

    /// Number of event types with a memoized invocation
    pub(crate) fn len(&self) -> usize {
        self.cache.len()
    }
}
