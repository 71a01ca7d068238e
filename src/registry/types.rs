//! Subscription types.

use std::any::TypeId;
use std::fmt;
use std::sync::Weak;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EventConfig;
use crate::error::DispatchResult;
use crate::event::Event;

use super::manager::RegistryInner;

/// Unique identifier for a subscription.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-erased subscriber callback.
pub(crate) type ErasedSubscriber = Box<dyn Fn(&dyn Event) -> DispatchResult + Send + Sync>;

/// Read-only snapshot of subscriptions resolved for a concrete event type.
///
/// Later subscribe/unsubscribe calls never mutate an already-returned
/// snapshot.
pub type SubscriptionList = std::sync::Arc<[std::sync::Arc<Subscription>]>;

/// The binding of one subscriber to one declared event type under one
/// delivery configuration.
///
/// Owned by the registry that created it; predicates passed to
/// [`unsubscribe_if`](super::EventRegistry::unsubscribe_if) and the bus's
/// exception handler see it by reference.
pub struct Subscription {
    id: SubscriptionId,
    event_type: TypeId,
    event_type_name: &'static str,
    config: EventConfig,
    owner: Option<Uuid>,
    subscriber: ErasedSubscriber,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        event_type: TypeId,
        event_type_name: &'static str,
        config: EventConfig,
        owner: Option<Uuid>,
        subscriber: ErasedSubscriber,
    ) -> Self {
        Self {
            id,
            event_type,
            event_type_name,
            config,
            owner,
            subscriber,
        }
    }

    /// The subscription's identifier.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The event type this subscription was registered against.
    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    /// Human-readable name of the declared event type.
    pub fn event_type_name(&self) -> &'static str {
        self.event_type_name
    }

    /// The delivery configuration.
    pub fn config(&self) -> EventConfig {
        self.config
    }

    /// Owner tag supplied at registration, if any.
    pub fn owner(&self) -> Option<Uuid> {
        self.owner
    }

    /// Invokes the subscriber with `event`.
    pub(crate) fn dispatch(&self, event: &dyn Event) -> DispatchResult {
        (self.subscriber)(event)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event_type", &self.event_type_name)
            .field("config", &self.config)
            .field("owner", &self.owner)
            .finish()
    }
}

/// Disposal handle for a single subscription.
///
/// Dropping the handle does *not* unsubscribe; the subscription lives until
/// [`dispose`](SubscriptionHandle::dispose) is called or a predicate sweep
/// removes it.
pub struct SubscriptionHandle {
    pub(crate) registry: Weak<RegistryInner>,
    pub(crate) id: SubscriptionId,
    pub(crate) event_type: TypeId,
}

impl SubscriptionHandle {
    /// The identifier of the subscription this handle controls.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes exactly this subscription from the registry.
    ///
    /// Idempotent: disposing twice (or after a predicate sweep already
    /// removed the subscription) is a no-op. A `post` that captured its
    /// snapshot before this call may still deliver to the subscription once;
    /// no future snapshot will contain it.
    pub fn dispose(&self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.remove(self.event_type, self.id);
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .finish()
    }
}
