//! Phase wrappers for BEFORE and AFTER handlers
//!
//! A handler taking `BeforeEvent<'_, E>` runs ahead of every plain handler for
//! the same event; one taking `AfterEvent<'_, E>` runs after all of them. The
//! wrapped event is the one being fired, seen as `E`.

use std::fmt;
use std::ops::Deref;

/// Event seen by a BEFORE handler
pub struct BeforeEvent<'a, E: ?Sized> {
    event: &'a E,
}

/// Event seen by an AFTER handler
pub struct AfterEvent<'a, E: ?Sized> {
    event: &'a E,
}

macro_rules! phase_wrapper {
    ($wrapper:ident) => {
        impl<'a, E: ?Sized> $wrapper<'a, E> {
            pub(crate) fn new(event: &'a E) -> Self {
                Self { event }
            }

            /// The event being fired
            pub fn event(&self) -> &'a E {
                self.event
            }
        }

        impl<E: ?Sized> Clone for $wrapper<'_, E> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<E: ?Sized> Copy for $wrapper<'_, E> {}

        impl<E: ?Sized> Deref for $wrapper<'_, E> {
            type Target = E;

            fn deref(&self) -> &E {
                self.event
            }
        }

        impl<E: ?Sized + fmt::Debug> fmt::Debug for $wrapper<'_, E> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($wrapper)).field(&self.event).finish()
            }
        }
    };
}

phase_wrapper!(BeforeEvent);
phase_wrapper!(AfterEvent);
