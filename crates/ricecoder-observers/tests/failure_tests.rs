//! Failure containment and failure reporting

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use anyhow::bail;
use parking_lot::Mutex;
use ricecoder_observers::*;

#[derive(Debug)]
struct Ping;

#[derive(Debug)]
struct Base;

/// Declares `Base` as its parent but does not embed one
#[derive(Debug)]
struct Impostor;

impl_event!(Ping, Base);

impl Event for Impostor {
    fn parent_type() -> Option<EventType> {
        Some(EventType::of::<Base>())
    }
}

/// Collects every failure report
#[derive(Default)]
struct FailureLog {
    reports: Mutex<Vec<(HandlerDescriptor, String)>>,
}

impl FailureLog {
    fn on_failed(&self, event: &ObserverFailed) -> HandlerResult {
        self.reports
            .lock()
            .push((event.handler().clone(), event.cause().to_string()));
        Ok(())
    }

    fn len(&self) -> usize {
        self.reports.lock().len()
    }
}

impl Observer for FailureLog {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar.on(Self::on_failed);
    }
}

/// Fails on `Ping`, and fails again on its own failure reports
#[derive(Default)]
struct Faulty {
    ping_calls: AtomicUsize,
    failure_calls: AtomicUsize,
}

impl Faulty {
    fn on_ping(&self, _: &Ping) -> HandlerResult {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        bail!("ping handler broke")
    }

    fn on_failed(&self, _: &ObserverFailed) -> HandlerResult {
        self.failure_calls.fetch_add(1, Ordering::SeqCst);
        bail!("failure handler broke too")
    }
}

impl Observer for Faulty {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar.on(Self::on_ping).on(Self::on_failed);
    }
}

/// Fails on every event it sees, failure reports included
struct Hostile {
    calls: AtomicUsize,
}

impl Observer for Hostile {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar.on_any(|hostile: &Hostile, _| {
            hostile.calls.fetch_add(1, Ordering::SeqCst);
            bail!("hostile")
        });
    }
}

/// INVOKE fails, BEFORE and AFTER record
#[derive(Default)]
struct Sandwich {
    journal: Mutex<Vec<&'static str>>,
}

impl Sandwich {
    fn before_ping(&self, _: BeforeEvent<'_, Ping>) -> HandlerResult {
        self.journal.lock().push("before");
        Ok(())
    }

    fn on_ping(&self, _: &Ping) -> HandlerResult {
        self.journal.lock().push("invoke");
        bail!("invoke failed")
    }

    fn after_ping(&self, _: AfterEvent<'_, Ping>) -> HandlerResult {
        self.journal.lock().push("after");
        Ok(())
    }
}

impl Observer for Sandwich {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar
            .before(Self::before_ping)
            .on(Self::on_ping)
            .after(Self::after_ping);
    }
}

/// Fires `Ping` again whenever a failure is reported, up to `limit` times
struct Retrier {
    manager: Weak<ObserverManager>,
    retries: AtomicUsize,
    limit: usize,
}

impl Retrier {
    fn on_failed(&self, _: &ObserverFailed) -> HandlerResult {
        if self.retries.fetch_add(1, Ordering::SeqCst) >= self.limit {
            return Ok(());
        }
        if let Some(manager) = self.manager.upgrade() {
            manager.fire(Arc::new(Ping));
        }
        Ok(())
    }
}

impl Observer for Retrier {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar.on(Self::on_failed);
    }
}

struct Panicky;

impl Panicky {
    fn on_ping(&self, _: &Ping) -> HandlerResult {
        panic!("handler exploded")
    }
}

impl Observer for Panicky {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar.on(Self::on_ping);
    }
}

#[derive(Default)]
struct Steady {
    pings: AtomicUsize,
    bases: AtomicUsize,
}

impl Steady {
    fn on_ping(&self, _: &Ping) -> HandlerResult {
        self.pings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_base(&self, _: &Base) -> HandlerResult {
        self.bases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Observer for Steady {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar.on(Self::on_ping).on(Self::on_base);
    }
}

#[test]
fn test_failure_is_reported_exactly_once() {
    let manager = ObserverManager::new();
    let faulty = Arc::new(Faulty::default());
    let log = Arc::new(FailureLog::default());
    manager.add_observer(faulty.clone()).unwrap();
    manager.add_observer(log.clone()).unwrap();

    // Must return normally
    manager.fire(Arc::new(Ping));

    assert_eq!(faulty.ping_calls.load(Ordering::SeqCst), 1);
    // Faulty saw its own report once and failed again, silently
    assert_eq!(faulty.failure_calls.load(Ordering::SeqCst), 1);
    assert_eq!(log.len(), 1);

    let (handler, cause) = log.reports.lock()[0].clone();
    assert!(handler.handler.ends_with("Faulty::on_ping"));
    assert_eq!(handler.phase, Phase::Invoke);
    assert_eq!(handler.event_type, EventType::of::<Ping>());
    assert_eq!(cause, "ping handler broke");
}

#[test]
fn test_failure_report_carries_observer_and_event() {
    let manager = ObserverManager::new();
    let faulty = Arc::new(Faulty::default());
    let captured: Arc<Mutex<Option<(bool, bool)>>> = Arc::new(Mutex::new(None));

    struct Inspector {
        captured: Arc<Mutex<Option<(bool, bool)>>>,
        faulty: Arc<Faulty>,
    }

    impl Observer for Inspector {
        fn observe(registrar: &mut Registrar<Self>) {
            registrar.on(|inspector: &Inspector, event: &ObserverFailed| {
                let same_observer = event
                    .observer_as::<Faulty>()
                    .map(|observer| Arc::ptr_eq(&observer, &inspector.faulty))
                    .unwrap_or(false);
                *inspector.captured.lock() = Some((same_observer, event.event().is::<Ping>()));
                Ok(())
            });
        }
    }

    manager.add_observer(faulty.clone()).unwrap();
    manager
        .add_observer(Arc::new(Inspector {
            captured: Arc::clone(&captured),
            faulty: Arc::clone(&faulty),
        }))
        .unwrap();

    manager.fire(Arc::new(Ping));
    assert_eq!(*captured.lock(), Some((true, true)));
}

#[test]
fn test_self_failing_wildcard_is_reported_once() {
    let manager = ObserverManager::new();
    let log = Arc::new(FailureLog::default());
    manager.add_observer(log.clone()).unwrap();

    let hostile = Arc::new(Hostile {
        calls: AtomicUsize::new(0),
    });
    // Fails on its own ObserverAdded; that is reported like any failure
    manager.add_observer(hostile.clone()).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(hostile.calls.load(Ordering::SeqCst), 2);

    hostile.calls.store(0, Ordering::SeqCst);
    manager.fire(Arc::new(Ping));

    // Ping, then the report for Ping, then nothing more
    assert_eq!(hostile.calls.load(Ordering::SeqCst), 2);
    assert_eq!(log.len(), 2);
}

#[test]
fn test_failures_are_reported_again_on_the_next_fire() {
    let manager = ObserverManager::new();
    let log = Arc::new(FailureLog::default());
    manager.add_observer(Arc::new(Faulty::default())).unwrap();
    manager.add_observer(log.clone()).unwrap();

    manager.fire(Arc::new(Ping));
    manager.fire(Arc::new(Ping));
    assert_eq!(log.len(), 2);
}

#[test]
fn test_nested_fire_from_failure_handler_does_not_report_again() {
    let manager = Arc::new(ObserverManager::new());
    let faulty = Arc::new(Faulty::default());
    let retrier = Arc::new(Retrier {
        manager: Arc::downgrade(&manager),
        retries: AtomicUsize::new(0),
        limit: 20,
    });
    let log = Arc::new(FailureLog::default());
    manager.add_observer(faulty.clone()).unwrap();
    manager.add_observer(retrier.clone()).unwrap();
    manager.add_observer(log.clone()).unwrap();

    manager.fire(Arc::new(Ping));

    // The retry reaches Faulty again, but it already failed in this fire
    assert_eq!(faulty.ping_calls.load(Ordering::SeqCst), 2);
    assert_eq!(retrier.retries.load(Ordering::SeqCst), 1);
    assert_eq!(log.len(), 1);

    manager.fire(Arc::new(Ping));
    assert_eq!(retrier.retries.load(Ordering::SeqCst), 2);
    assert_eq!(log.len(), 2);
}

#[test]
fn test_after_runs_when_invoke_fails() {
    let manager = ObserverManager::new();
    let sandwich = Arc::new(Sandwich::default());
    let log = Arc::new(FailureLog::default());
    manager.add_observer(sandwich.clone()).unwrap();
    manager.add_observer(log.clone()).unwrap();

    manager.fire(Arc::new(Ping));

    assert_eq!(*sandwich.journal.lock(), vec!["before", "invoke", "after"]);
    assert_eq!(log.len(), 1);
}

#[test]
fn test_failing_handler_does_not_stop_the_others() {
    let manager = ObserverManager::new();
    let steady_before = Arc::new(Steady::default());
    let steady_after = Arc::new(Steady::default());
    manager.add_observer(steady_before.clone()).unwrap();
    manager.add_observer(Arc::new(Faulty::default())).unwrap();
    manager.add_observer(steady_after.clone()).unwrap();

    manager.fire(Arc::new(Ping));

    assert_eq!(steady_before.pings.load(Ordering::SeqCst), 1);
    assert_eq!(steady_after.pings.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panicking_handler_is_contained() {
    let manager = ObserverManager::new();
    let log = Arc::new(FailureLog::default());
    let steady = Arc::new(Steady::default());
    manager.add_observer(Arc::new(Panicky)).unwrap();
    manager.add_observer(steady.clone()).unwrap();
    manager.add_observer(log.clone()).unwrap();

    manager.fire(Arc::new(Ping));

    assert_eq!(steady.pings.load(Ordering::SeqCst), 1);
    assert_eq!(log.len(), 1);
    let (_, cause) = log.reports.lock()[0].clone();
    assert_eq!(cause, "handler panicked: handler exploded");
}

#[test]
#[should_panic(expected = "handler exploded")]
fn test_panics_propagate_when_not_caught() {
    let manager = ObserverManager::with_config(ManagerConfig {
        catch_panics: false,
        ..ManagerConfig::default()
    })
    .unwrap();
    manager.add_observer(Arc::new(Panicky)).unwrap();

    manager.fire(Arc::new(Ping));
}

#[test]
fn test_event_mismatch_is_not_reported_as_observer_failure() {
    let manager = ObserverManager::new();
    let log = Arc::new(FailureLog::default());
    let steady = Arc::new(Steady::default());
    manager.add_observer(steady.clone()).unwrap();
    manager.add_observer(log.clone()).unwrap();

    // Resolves to the Base handler, which cannot be handed a Base value
    manager.fire(Arc::new(Impostor));

    assert_eq!(steady.bases.load(Ordering::SeqCst), 0);
    assert_eq!(log.len(), 0);
}
