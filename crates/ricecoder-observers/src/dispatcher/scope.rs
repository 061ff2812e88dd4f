//! Call-scoped dispatch state

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use crate::dispatcher::ObserverManager;
use crate::events::{Event, EventType, ObserverFailed};

type FailedSet = Rc<RefCell<HashSet<u64>>>;

thread_local! {
    /// Failure sets of the outer `fire` calls running on this thread, by manager
    static ACTIVE: RefCell<HashMap<usize, FailedSet>> = RefCell::new(HashMap::new());
}

/// State of one outer `fire` call
///
/// Remembers which handlers already failed during the call so a handler that
/// keeps failing on the `ObserverFailed` events caused by its own failures is
/// reported once and then ignored. A `fire` made by a handler on the same
/// thread joins the running call's scope; the failure set is dropped when the
/// outermost call returns.
pub(crate) struct FireScope<'a> {
    manager: &'a ObserverManager,
    failed: FailedSet,
    outermost: bool,
}

impl<'a> FireScope<'a> {
    /// Join the outer call running on this thread, or start one
    pub(crate) fn enter(manager: &'a ObserverManager) -> Self {
        let key = manager_key(manager);
        let (failed, outermost) = ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            match active.get(&key) {
                Some(failed) => (Rc::clone(failed), false),
                None => {
                    let failed = FailedSet::default();
                    active.insert(key, Rc::clone(&failed));
                    (failed, true)
                }
            }
        });

        Self {
            manager,
            failed,
            outermost,
        }
    }

    pub(crate) fn catch_panics(&self) -> bool {
        self.manager.config().catch_panics
    }

    /// Record a failing invocation; `false` if it already failed in this call
    pub(crate) fn record_failure(&self, invocation: u64) -> bool {
        self.failed.borrow_mut().insert(invocation)
    }

    /// Whether `event` is a failure report, directly or by descent
    pub(crate) fn is_failure_report(&self, event: &dyn Event) -> bool {
        event.is_a(
            EventType::of::<ObserverFailed>(),
            self.manager.config().max_hierarchy_depth,
        )
    }

    /// Deliver `event` within this scope
    pub(crate) fn dispatch(&self, event: Arc<dyn Event>) {
        self.manager.dispatch(event, self);
    }
}

impl Drop for FireScope<'_> {
    fn drop(&mut self) {
        if !self.outermost {
            return;
        }
        let key = manager_key(self.manager);
        // The slot is already gone if the thread is shutting down
        let _ = ACTIVE.try_with(|active| active.borrow_mut().remove(&key));
    }
}

fn manager_key(manager: &ObserverManager) -> usize {
    manager as *const ObserverManager as usize
}
