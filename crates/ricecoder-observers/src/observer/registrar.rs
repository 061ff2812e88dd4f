//! Handler binding for observers
//!
//! The registrar replaces reflective method discovery: an observer lists its
//! handlers explicitly, and the handler signatures already enforce most shape
//! rules (one event parameter, an instance receiver, a concrete event type).
//! The remaining rules are checked here, at registration time.

use std::any::type_name;

use crate::error::{HandlerResult, InvocationError, ObserverError, Result, Violation};
use crate::events::{AfterEvent, BeforeEvent, Event, EventType};
use crate::observer::{HandlerDescriptor, Phase};

/// Type-erased call of one handler on an observer of type `O`
pub(crate) type BoundCall<O> =
    Box<dyn Fn(&O, &dyn Event) -> std::result::Result<(), InvocationError> + Send + Sync>;

pub(crate) struct Binding<O> {
    pub(crate) handler: HandlerDescriptor,
    pub(crate) call: BoundCall<O>,
}

/// Collects the handlers of one observer type
pub struct Registrar<O> {
    max_depth: usize,
    bindings: Vec<Binding<O>>,
    violation: Option<(&'static str, Violation)>,
}

impl<O: Send + Sync + 'static> Registrar<O> {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            bindings: Vec::new(),
            violation: None,
        }
    }

    /// Bind a handler for events of type `E` and its descendants
    pub fn on<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&O, &E) -> HandlerResult + Send + Sync + 'static,
    {
        let max_depth = self.max_depth;
        self.bind(
            Phase::Invoke,
            EventType::of::<E>(),
            type_name::<F>(),
            Box::new(move |observer: &O, event: &dyn Event| {
                let event = expect_event::<E>(event, max_depth)?;
                handler(observer, event).map_err(InvocationError::Handler)
            }),
        )
    }

    /// Bind a handler that runs before every plain handler of `E`
    pub fn before<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&O, BeforeEvent<'_, E>) -> HandlerResult + Send + Sync + 'static,
    {
        let max_depth = self.max_depth;
        self.bind(
            Phase::Before,
            EventType::of::<E>(),
            type_name::<F>(),
            Box::new(move |observer: &O, event: &dyn Event| {
                let event = expect_event::<E>(event, max_depth)?;
                handler(observer, BeforeEvent::new(event)).map_err(InvocationError::Handler)
            }),
        )
    }

    /// Bind a handler that runs after every plain handler of `E`
    pub fn after<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&O, AfterEvent<'_, E>) -> HandlerResult + Send + Sync + 'static,
    {
        let max_depth = self.max_depth;
        self.bind(
            Phase::After,
            EventType::of::<E>(),
            type_name::<F>(),
            Box::new(move |observer: &O, event: &dyn Event| {
                let event = expect_event::<E>(event, max_depth)?;
                handler(observer, AfterEvent::new(event)).map_err(InvocationError::Handler)
            }),
        )
    }

    /// Bind a handler for every event
    pub fn on_any<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&O, &dyn Event) -> HandlerResult + Send + Sync + 'static,
    {
        self.bind(
            Phase::Invoke,
            EventType::any(),
            type_name::<F>(),
            Box::new(move |observer: &O, event: &dyn Event| {
                handler(observer, event).map_err(InvocationError::Handler)
            }),
        )
    }

    /// Bind a BEFORE handler for every event
    pub fn before_any<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&O, BeforeEvent<'_, dyn Event>) -> HandlerResult + Send + Sync + 'static,
    {
        self.bind(
            Phase::Before,
            EventType::any(),
            type_name::<F>(),
            Box::new(move |observer: &O, event: &dyn Event| {
                handler(observer, BeforeEvent::new(event)).map_err(InvocationError::Handler)
            }),
        )
    }

    /// Bind an AFTER handler for every event
    pub fn after_any<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&O, AfterEvent<'_, dyn Event>) -> HandlerResult + Send + Sync + 'static,
    {
        self.bind(
            Phase::After,
            EventType::any(),
            type_name::<F>(),
            Box::new(move |observer: &O, event: &dyn Event| {
                handler(observer, AfterEvent::new(event)).map_err(InvocationError::Handler)
            }),
        )
    }

    fn bind(
        &mut self,
        phase: Phase,
        event_type: EventType,
        handler: &'static str,
        call: BoundCall<O>,
    ) -> &mut Self {
        // Only the first violation is reported
        if self.violation.is_some() {
            return self;
        }

        if let Some(previous) = self
            .bindings
            .iter()
            .find(|b| b.handler.phase == phase && b.handler.event_type == event_type)
        {
            self.violation = Some((
                handler,
                Violation::DuplicateHandler {
                    phase,
                    event_type,
                    previous: previous.handler.handler,
                },
            ));
            return self;
        }

        if event_type.chain_len(self.max_depth).is_none() {
            self.violation = Some((
                handler,
                Violation::UnresolvableEventType {
                    event_type,
                    max_depth: self.max_depth,
                },
            ));
            return self;
        }

        self.bindings.push(Binding {
            handler: HandlerDescriptor {
                observer: type_name::<O>(),
                handler,
                phase,
                event_type,
            },
            call,
        });
        self
    }

    /// Validated bindings, in binding order
    pub(crate) fn finish(self) -> Result<Vec<Binding<O>>> {
        if let Some((handler, violation)) = self.violation {
            return Err(ObserverError::InvalidObserver {
                observer: type_name::<O>(),
                handler,
                violation,
            });
        }

        if self.bindings.is_empty() {
            return Err(ObserverError::NotAnObserver {
                observer: type_name::<O>(),
            });
        }

        Ok(self.bindings)
    }
}

fn expect_event<E: Event>(
    event: &dyn Event,
    max_depth: usize,
) -> std::result::Result<&E, InvocationError> {
    event
        .ancestor::<E>(max_depth)
        .ok_or_else(|| InvocationError::EventMismatch {
            expected: type_name::<E>(),
            actual: event.event_type().name(),
        })
}
