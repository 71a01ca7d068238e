//! Failure isolation and exception handler behavior.

use std::any::{Any, TypeId};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use herald::{
    Event, EventBus, EventConfig, EventError, EventRegistry, Subscription, SubscriptionId,
};
use parking_lot::Mutex;

#[derive(Default)]
struct TestEvent {
    touches: Cell<u32>,
}

impl Event for TestEvent {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Descendant that declares an ancestor without providing a view for it.
#[derive(Default)]
struct BrokenEvent;

impl Event for BrokenEvent {
    fn ancestors() -> Vec<TypeId> {
        vec![TypeId::of::<TestEvent>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Collects everything the bus forwards to it.
#[derive(Clone, Default)]
struct CollectingHandler {
    caught: Arc<Mutex<Vec<(SubscriptionId, String)>>>,
}

impl herald::EventExceptionHandler for CollectingHandler {
    fn handle(&self, subscription: &Subscription, _event: &dyn Event, error: EventError) {
        self.caught.lock().push((subscription.id(), error.to_string()));
    }
}

#[test]
fn test_failing_subscriber_is_isolated() {
    let handler = CollectingHandler::default();
    let bus = EventBus::new(EventRegistry::new(), handler.clone());

    let failing = bus
        .registry()
        .subscribe::<TestEvent, _>(EventConfig::DEFAULTS, |_event| {
            Err(EventError::msg("broken pipe"))
        });
    bus.registry()
        .subscribe::<TestEvent, _>(EventConfig::DEFAULTS, |event| {
            event.touches.set(event.touches.get() + 1);
            Ok(())
        });

    let event = TestEvent::default();
    bus.post(&event);

    // The registered-later subscriber still ran.
    assert_eq!(event.touches.get(), 1);

    // The handler saw exactly one failure, from the failing subscription.
    let caught = handler.caught.lock();
    assert_eq!(caught.len(), 1);
    assert_eq!(caught[0].0, failing.id());
    assert!(caught[0].1.contains("broken pipe"));
}

#[test]
fn test_poster_never_sees_subscriber_errors() {
    let handler = CollectingHandler::default();
    let bus = EventBus::new(EventRegistry::new(), handler.clone());

    for _ in 0..3 {
        bus.registry()
            .subscribe::<TestEvent, _>(EventConfig::DEFAULTS, |_event| {
                Err(EventError::msg("always fails"))
            });
    }

    // post returns normally regardless of subscriber outcomes.
    bus.post(&TestEvent::default());
    assert_eq!(handler.caught.lock().len(), 3);
}

#[test]
fn test_wrapped_error_source_reaches_handler() {
    let sources = Arc::new(AtomicUsize::new(0));
    let registry = EventRegistry::new();
    let bus = {
        let sources = sources.clone();
        EventBus::new(
            registry,
            move |_subscription: &Subscription, _event: &dyn Event, error: EventError| {
                if std::error::Error::source(&error).is_some() {
                    sources.fetch_add(1, Ordering::SeqCst);
                }
            },
        )
    };

    bus.registry()
        .subscribe::<TestEvent, _>(EventConfig::DEFAULTS, |_event| {
            let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow disk");
            Err(EventError::subscriber(io))
        });

    bus.post(&TestEvent::default());
    assert_eq!(sources.load(Ordering::SeqCst), 1);
}

#[test]
fn test_missing_ancestor_view_is_a_dispatch_failure() {
    let handler = CollectingHandler::default();
    let bus = EventBus::new(EventRegistry::new(), handler.clone());

    // Registered against the ancestor BrokenEvent declares but cannot lend.
    bus.registry()
        .subscribe::<TestEvent, _>(EventConfig::DEFAULTS, |_event| Ok(()));

    bus.post(&BrokenEvent);

    let caught = handler.caught.lock();
    assert_eq!(caught.len(), 1);
    assert!(caught[0].1.contains("no view"));
}

#[test]
#[should_panic(expected = "handler gave up")]
fn test_panicking_handler_propagates_out_of_post() {
    let bus = EventBus::new(
        EventRegistry::new(),
        |_subscription: &Subscription, _event: &dyn Event, _error: EventError| {
            panic!("handler gave up")
        },
    );

    bus.registry()
        .subscribe::<TestEvent, _>(EventConfig::DEFAULTS, |_event| {
            Err(EventError::msg("trigger"))
        });

    bus.post(&TestEvent::default());
}
