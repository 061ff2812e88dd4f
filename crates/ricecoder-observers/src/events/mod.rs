//! Event model for the observer system
//!
//! Any `Send + Sync + Debug + 'static` value can be an event once it implements
//! [`Event`]. The runtime concrete type of the value decides which handlers run.
//!
//! # Hierarchy
//!
//! Event types form single-parent chains. A type names its parent with
//! [`Event::parent_type`] and hands out the embedded parent value with
//! [`Event::parent_event`], so a handler bound to `Ping` can receive the `Ping`
//! part of a `LoudPing`. Every chain implicitly ends at [`EventType::any`].
//!
//! ```ignore
//! #[derive(Debug)]
//! struct Ping { seq: u32 }
//!
//! #[derive(Debug)]
//! struct LoudPing { ping: Ping, volume: u8 }
//!
//! impl_event!(Ping);
//! impl_event!(LoudPing: Ping => ping);
//! ```

pub mod lifecycle;
pub mod phase;

pub use lifecycle::{ObserverAdded, ObserverFailed, ObserverRemoved};
pub use phase::{AfterEvent, BeforeEvent};

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A value that can be fired through an [`ObserverManager`](crate::ObserverManager)
pub trait Event: EventIdentity + Send + Sync + fmt::Debug + 'static {
    /// Declared parent type, if this event extends another one
    fn parent_type() -> Option<EventType>
    where
        Self: Sized,
    {
        None
    }

    /// The embedded parent value; must agree with [`Event::parent_type`]
    fn parent_event(&self) -> Option<&dyn Event> {
        None
    }
}

/// Runtime identity of an event value
///
/// Implemented for every [`Event`]; not meant to be implemented by hand.
pub trait EventIdentity {
    /// Concrete type of this value
    fn event_type(&self) -> EventType;

    /// This value as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> EventIdentity for E {
    fn event_type(&self) -> EventType {
        EventType::of::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Event {
    /// Whether the concrete type of this value is exactly `E`
    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// Downcast to the exact concrete type
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }

    /// Find the `E` part of this value by walking `parent_event`
    ///
    /// Looks at no more than `max_depth` values, this one included.
    pub fn ancestor<E: Event>(&self, max_depth: usize) -> Option<&E> {
        let mut current: Option<&dyn Event> = Some(self);
        let mut remaining = max_depth;

        while let Some(candidate) = current {
            if remaining == 0 {
                break;
            }
            remaining -= 1;

            if let Some(found) = candidate.downcast_ref::<E>() {
                return Some(found);
            }
            current = candidate.parent_event();
        }

        None
    }

    /// Whether this value's type is `event_type` or descends from it
    pub fn is_a(&self, event_type: EventType, max_depth: usize) -> bool {
        self.event_type()
            .ancestry(max_depth)
            .any(|ancestor| ancestor == event_type)
    }
}

/// Identity of a concrete event type plus a link to its declared parent
///
/// Equality and hashing only look at the `TypeId`.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
    parent: fn() -> Option<EventType>,
}

fn no_parent() -> Option<EventType> {
    None
}

impl EventType {
    /// Identity of the concrete event type `E`
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            parent: E::parent_type,
        }
    }

    /// The universal root every event type descends from
    pub fn any() -> Self {
        Self {
            id: TypeId::of::<dyn Event>(),
            name: "dyn Event",
            parent: no_parent,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared parent, never the universal root
    pub fn parent(&self) -> Option<EventType> {
        (self.parent)().filter(|parent| !parent.is_any())
    }

    pub fn is_any(&self) -> bool {
        self.id == TypeId::of::<dyn Event>()
    }

    /// Number of types in the chain from `self` up to (excluding) the root
    ///
    /// `None` when the chain is longer than `max_depth`, which also catches
    /// cyclic parent declarations.
    pub fn chain_len(&self, max_depth: usize) -> Option<usize> {
        if self.is_any() {
            return Some(0);
        }

        let mut len = 1;
        let mut current = self.parent();
        while let Some(parent) = current {
            len += 1;
            if len > max_depth {
                return None;
            }
            current = parent.parent();
        }

        if len > max_depth {
            None
        } else {
            Some(len)
        }
    }

    /// `self`, its ancestors nearest first, then the universal root
    ///
    /// At most `max_depth` non-root types are produced; the root always comes last.
    pub fn ancestry(&self, max_depth: usize) -> Ancestry {
        Ancestry {
            next: Some(*self).filter(|ty| !ty.is_any()),
            remaining: max_depth,
            root_pending: true,
            truncated: false,
        }
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator returned by [`EventType::ancestry`]
#[derive(Debug, Clone)]
pub struct Ancestry {
    next: Option<EventType>,
    remaining: usize,
    root_pending: bool,
    truncated: bool,
}

impl Ancestry {
    /// Whether the walk stopped at the depth bound before reaching the root
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl Iterator for Ancestry {
    type Item = EventType;

    fn next(&mut self) -> Option<EventType> {
        if let Some(current) = self.next.take() {
            if self.remaining > 0 {
                self.remaining -= 1;
                self.next = current.parent();
                return Some(current);
            }
            self.truncated = true;
        }

        if self.root_pending {
            self.root_pending = false;
            return Some(EventType::any());
        }

        None
    }
}

/// Implement [`Event`] for plain types or for types extending a parent event
///
/// ```ignore
/// impl_event!(Ping, Pong);
/// impl_event!(LoudPing: Ping => ping); // `ping` is the field holding the parent
/// ```
#[macro_export]
macro_rules! impl_event {
    ($event:ty : $parent:ty => $field:ident) => {
        impl $crate::Event for $event {
            fn parent_type() -> ::core::option::Option<$crate::EventType> {
                ::core::option::Option::Some($crate::EventType::of::<$parent>())
            }

            fn parent_event(&self) -> ::core::option::Option<&dyn $crate::Event> {
                ::core::option::Option::Some(&self.$field)
            }
        }
    };
    ($($event:ty),+ $(,)?) => {
        $(impl $crate::Event for $event {})+
    };
}
