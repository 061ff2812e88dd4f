//! Per-observer handler tables
//!
//! Built once per registration. Each phase keeps a map from the event type a
//! handler was bound for to the handler, already bound to the observer object.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::events::lifecycle::ObserverHandle;
use crate::events::{Event, EventType};
use crate::invocation::MethodInvocation;
use crate::observer::{Observer, ObserverKey, Phase, Registrar};

type HandlerTable = HashMap<TypeId, Arc<MethodInvocation>>;

/// Registered observer with its bound handlers
pub(crate) struct ObserverDescriptor {
    key: ObserverKey,
    observer_type: &'static str,
    target: ObserverHandle,
    before: HandlerTable,
    invoke: HandlerTable,
    after: HandlerTable,
}

impl ObserverDescriptor {
    /// Collect and validate the handlers of `observer`
    pub(crate) fn build<O: Observer>(observer: Arc<O>, max_depth: usize) -> Result<Self> {
        let mut registrar = Registrar::<O>::new(max_depth);
        O::observe(&mut registrar);
        let bindings = registrar.finish()?;

        let target: ObserverHandle = observer.clone();
        let mut descriptor = Self {
            key: ObserverKey::of(&observer),
            observer_type: type_name::<O>(),
            target: Arc::clone(&target),
            before: HashMap::new(),
            invoke: HashMap::new(),
            after: HashMap::new(),
        };

        for binding in bindings {
            let bound = Arc::clone(&observer);
            let call = binding.call;
            let phase = binding.handler.phase;
            let event_type = binding.handler.event_type;

            let method = MethodInvocation::new(
                binding.handler,
                Arc::clone(&target),
                Box::new(move |event: &dyn Event| call(&*bound, event)),
            );
            descriptor
                .table_mut(phase)
                .insert(event_type.id(), Arc::new(method));
        }

        debug!(
            observer = descriptor.observer_type,
            before = descriptor.before.len(),
            invoke = descriptor.invoke.len(),
            after = descriptor.after.len(),
            "Built observer descriptor"
        );

        Ok(descriptor)
    }

    pub(crate) fn key(&self) -> ObserverKey {
        self.key
    }

    pub(crate) fn target(&self) -> &ObserverHandle {
        &self.target
    }

    pub(crate) fn observer_type(&self) -> &'static str {
        self.observer_type
    }

    /// Most specific handler for `event_type` in `phase`
    ///
    /// Walks from the concrete type up through its ancestors to the universal
    /// root and returns the first bound handler.
    pub(crate) fn get(
        &self,
        phase: Phase,
        event_type: EventType,
        max_depth: usize,
    ) -> Option<Arc<MethodInvocation>> {
        let table = self.table(phase);
        if table.is_empty() {
            return None;
        }

        event_type
            .ancestry(max_depth)
            .find_map(|ancestor| table.get(&ancestor.id()).cloned())
    }

    fn table(&self, phase: Phase) -> &HandlerTable {
        match phase {
            Phase::Before => &self.before,
            Phase::Invoke => &self.invoke,
            Phase::After => &self.after,
        }
    }

    fn table_mut(&mut self, phase: Phase) -> &mut HandlerTable {
        match phase {
            Phase::Before => &mut self.before,
            Phase::Invoke => &mut self.invoke,
            Phase::After => &mut self.after,
        }
    }
}
