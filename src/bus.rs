//! Event bus: resolves subscribers for a posted event, filters them, and
//! dispatches in registry order while isolating subscriber failures.

use std::any::TypeId;

use tracing::error;

use crate::config::EventConfig;
use crate::error::EventError;
use crate::event::Event;
use crate::registry::{EventRegistry, Subscription};

/// Receives failures the bus caught during dispatch.
///
/// The bus has already decided to continue with the next subscriber by the
/// time the handler runs; the handler exists for observability. A handler
/// that panics propagates out of `post`, and the remaining subscribers for
/// that call do not run.
pub trait EventExceptionHandler: Send + Sync {
    /// Handles one caught failure, with the responsible subscription and the
    /// event that was being delivered.
    fn handle(&self, subscription: &Subscription, event: &dyn Event, error: EventError);
}

impl<F> EventExceptionHandler for F
where
    F: Fn(&Subscription, &dyn Event, EventError) + Send + Sync,
{
    fn handle(&self, subscription: &Subscription, event: &dyn Event, error: EventError) {
        self(subscription, event, error)
    }
}

/// Exception handler that records failures to the `tracing` error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingExceptionHandler;

impl EventExceptionHandler for LoggingExceptionHandler {
    fn handle(&self, subscription: &Subscription, _event: &dyn Event, error: EventError) {
        error!(
            subscription = %subscription.id(),
            event_type = subscription.event_type_name(),
            %error,
            "subscriber failed",
        );
    }
}

/// Synchronous, in-process event bus.
///
/// The bus holds no subscription state of its own: every `post` resolves a
/// fresh snapshot from the injected registry, filters each subscription by
/// its config, and invokes accepted subscribers on the calling thread, in
/// snapshot order. Subscriber failures go to the exception handler and never
/// to the poster.
///
/// The bus is stateless between calls and fully re-entrant: a subscriber may
/// subscribe, dispose, or post on the same bus, since no registry lock is
/// held while subscribers run.
pub struct EventBus {
    registry: EventRegistry,
    exceptions: Box<dyn EventExceptionHandler>,
}

impl EventBus {
    /// Creates a bus over `registry` with an injected exception handler.
    pub fn new(registry: EventRegistry, exceptions: impl EventExceptionHandler + 'static) -> Self {
        Self {
            registry,
            exceptions: Box::new(exceptions),
        }
    }

    /// Creates a bus that logs subscriber failures via `tracing`.
    pub fn with_logging(registry: EventRegistry) -> Self {
        Self::new(registry, LoggingExceptionHandler)
    }

    /// The registry this bus resolves subscribers from.
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Posts an event to all matching subscribers.
    pub fn post<E: Event>(&self, event: &E) {
        self.post_filtered(event, None);
    }

    /// Posts an event; with `Some(order)`, only subscriptions whose config
    /// order equals `order` are delivered to.
    ///
    /// Returns after every matching subscriber has run or been skipped.
    /// Delivery order is exactly the registry's snapshot order. A
    /// subscriber failure is forwarded to the exception handler and does not
    /// stop delivery to the remaining subscribers.
    pub fn post_filtered<E: Event>(&self, event: &E, order: Option<i32>) {
        let subscriptions = self.registry.subscriptions::<E>();
        if subscriptions.is_empty() {
            return;
        }
        let runtime_type = TypeId::of::<E>();
        for subscription in subscriptions.iter() {
            if !accepts(subscription.config(), subscription.event_type(), runtime_type, event, order) {
                continue;
            }
            if let Err(err) = subscription.dispatch(event) {
                self.exceptions.handle(subscription, event, err);
            }
        }
    }
}

/// Acceptance predicate for one `(subscription, event, order filter)` triple.
/// The three checks are independent; their order is just the cheapest-first.
fn accepts(
    config: EventConfig,
    declared_type: TypeId,
    runtime_type: TypeId,
    event: &dyn Event,
    order: Option<i32>,
) -> bool {
    if config.exact() && runtime_type != declared_type {
        return false;
    }
    if let Some(order) = order {
        if config.order() != order {
            return false;
        }
    }
    if !config.accepts_cancelled() {
        if let Some(cancellable) = event.as_cancellable() {
            if cancellable.cancelled() {
                return false;
            }
        }
    }
    true
}
