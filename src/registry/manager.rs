//! Subscription registry: groups subscriptions by declared event type and
//! resolves the polymorphic subscription set for a concrete type.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::EventConfig;
use crate::error::{DispatchResult, EventError};
use crate::event::{event_view, root_type_id, Event};

use super::types::{ErasedSubscriber, Subscription, SubscriptionHandle, SubscriptionId, SubscriptionList};

/// Base event type a registry is scoped to.
#[derive(Clone, Copy)]
struct Scope {
    id: TypeId,
    name: &'static str,
}

/// A cached resolution for one concrete event type.
///
/// `chain` is the traversal order the subscriptions were collected in; it is
/// kept so mutations can invalidate exactly the resolutions they affect.
struct Resolution {
    chain: Vec<TypeId>,
    subscriptions: SubscriptionList,
}

#[derive(Default)]
struct RegistryState {
    /// Live subscriptions grouped by declared type, in registration order.
    by_type: HashMap<TypeId, Vec<Arc<Subscription>>>,
    /// Derived, per-concrete-type resolutions. Pure optimization.
    resolved: HashMap<TypeId, Resolution>,
}

impl RegistryState {
    /// Drops every cached resolution whose traversal chain contains `ty`.
    fn invalidate(&mut self, ty: TypeId) {
        self.resolved
            .retain(|_, resolution| !resolution.chain.contains(&ty));
    }
}

pub(crate) struct RegistryInner {
    scope: Scope,
    next_id: AtomicU64,
    state: RwLock<RegistryState>,
}

impl RegistryInner {
    /// Removes one subscription by id. No-op if it is already gone.
    pub(crate) fn remove(&self, event_type: TypeId, id: SubscriptionId) {
        let mut state = self.state.write();
        let Some(list) = state.by_type.get_mut(&event_type) else {
            return;
        };
        let before = list.len();
        list.retain(|subscription| subscription.id() != id);
        if list.len() == before {
            return;
        }
        if list.is_empty() {
            state.by_type.remove(&event_type);
        }
        state.invalidate(event_type);
        trace!(subscription = %id, "unsubscribed");
    }
}

/// Owns all subscriptions and the per-type resolution index.
///
/// Cheap to clone; clones share the same underlying registry. Safe for
/// concurrent use: every operation locks the internal state only for the
/// duration of the mutation or snapshot, never across a subscriber call.
///
/// # Ordering
///
/// [`subscriptions`](EventRegistry::subscriptions) returns matches grouped
/// by declared type: the concrete type's own subscriptions first, then each
/// declared ancestor's in the order the event type lists them, then
/// subscriptions against the universal root. Within one declared type,
/// registration order is preserved. The cross-type traversal order is stable
/// but carries no semantic meaning beyond determinism.
#[derive(Clone)]
pub struct EventRegistry {
    inner: Arc<RegistryInner>,
}

impl EventRegistry {
    /// Creates a registry scoped to the universal root: any event type may
    /// be registered.
    pub fn new() -> Self {
        Self::with_scope(Scope {
            id: root_type_id(),
            name: type_name::<dyn Event>(),
        })
    }

    /// Creates a registry scoped to the base event type `B`.
    ///
    /// Registrations must be for `B` or a type that lists `B` among its
    /// ancestors; anything else is a programming error and panics at the
    /// `subscribe` call site.
    pub fn scoped<B: Event>() -> Self {
        Self::with_scope(Scope {
            id: TypeId::of::<B>(),
            name: type_name::<B>(),
        })
    }

    fn with_scope(scope: Scope) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                scope,
                next_id: AtomicU64::new(1),
                state: RwLock::new(RegistryState::default()),
            }),
        }
    }

    /// The base event type this registry is scoped to.
    pub fn base_type(&self) -> TypeId {
        self.inner.scope.id
    }

    /// Human-readable name of the base event type.
    pub fn base_type_name(&self) -> &'static str {
        self.inner.scope.name
    }

    /// Registers `subscriber` against event type `T`.
    ///
    /// The subscriber fires for events whose runtime type is `T` or lists
    /// `T` as an ancestor, subject to the delivery rules in `config`. Never
    /// fails for in-scope types; the returned handle removes the
    /// subscription.
    ///
    /// # Panics
    ///
    /// Panics if `T` is outside the hierarchy a scoped registry was created
    /// for.
    pub fn subscribe<T, F>(&self, config: EventConfig, subscriber: F) -> SubscriptionHandle
    where
        T: Event,
        F: Fn(&T) -> DispatchResult + Send + Sync + 'static,
    {
        self.subscribe_inner(None, config, subscriber)
    }

    /// Registers `subscriber` against `T`, tagged with an owner id.
    ///
    /// The tag is visible to [`unsubscribe_if`](EventRegistry::unsubscribe_if)
    /// predicates, so all subscriptions of one owner can be removed in a
    /// single sweep.
    ///
    /// # Panics
    ///
    /// Panics if `T` is outside the hierarchy a scoped registry was created
    /// for.
    pub fn subscribe_owned<T, F>(
        &self,
        owner: Uuid,
        config: EventConfig,
        subscriber: F,
    ) -> SubscriptionHandle
    where
        T: Event,
        F: Fn(&T) -> DispatchResult + Send + Sync + 'static,
    {
        self.subscribe_inner(Some(owner), config, subscriber)
    }

    /// Registers a subscriber against the universal root; it receives every
    /// posted event.
    ///
    /// An `exact` config on a root subscription never matches, since no
    /// event's runtime type is the root itself.
    ///
    /// # Panics
    ///
    /// Panics on a registry scoped to anything narrower than the root.
    pub fn subscribe_any<F>(&self, config: EventConfig, subscriber: F) -> SubscriptionHandle
    where
        F: Fn(&dyn Event) -> DispatchResult + Send + Sync + 'static,
    {
        assert!(
            self.inner.scope.id == root_type_id(),
            "subscribe_any requires a root-scoped registry, this one is scoped to `{}`",
            self.inner.scope.name,
        );
        self.insert(
            root_type_id(),
            type_name::<dyn Event>(),
            config,
            None,
            Box::new(subscriber),
        )
    }

    /// Whether any live subscription matches event type `T`.
    pub fn subscribed<T: Event>(&self) -> bool {
        !self.subscriptions::<T>().is_empty()
    }

    /// Resolves every live subscription whose declared type is `T` or an
    /// ancestor of `T`, as a read-only snapshot.
    ///
    /// See the type-level docs for the ordering contract. Resolutions are
    /// cached per concrete type and recomputed after a mutation touches any
    /// type in the traversal chain.
    pub fn subscriptions<T: Event>(&self) -> SubscriptionList {
        let ty = TypeId::of::<T>();
        {
            let state = self.inner.state.read();
            if let Some(resolution) = state.resolved.get(&ty) {
                return resolution.subscriptions.clone();
            }
        }
        self.resolve(ty, type_name::<T>(), ancestor_chain::<T>())
    }

    /// Removes every subscription for which `predicate` returns true, across
    /// all declared types.
    ///
    /// Atomic with respect to any single `subscriptions` call: a snapshot
    /// either predates the sweep entirely or reflects it entirely.
    pub fn unsubscribe_if<P>(&self, mut predicate: P)
    where
        P: FnMut(&Subscription) -> bool,
    {
        let mut state = self.inner.state.write();
        let mut touched: Vec<TypeId> = Vec::new();
        state.by_type.retain(|ty, list| {
            let before = list.len();
            list.retain(|subscription| !predicate(subscription));
            if list.len() != before {
                touched.push(*ty);
            }
            !list.is_empty()
        });
        if touched.is_empty() {
            return;
        }
        let removed_from = touched.len();
        for ty in touched {
            state.invalidate(ty);
        }
        trace!(types = removed_from, "unsubscribed by predicate");
    }

    /// Number of live subscriptions across all declared types.
    pub fn subscription_count(&self) -> usize {
        self.inner
            .state
            .read()
            .by_type
            .values()
            .map(Vec::len)
            .sum()
    }

    fn subscribe_inner<T, F>(
        &self,
        owner: Option<Uuid>,
        config: EventConfig,
        subscriber: F,
    ) -> SubscriptionHandle
    where
        T: Event,
        F: Fn(&T) -> DispatchResult + Send + Sync + 'static,
    {
        self.assert_in_scope(TypeId::of::<T>(), type_name::<T>(), &T::ancestors());
        let erased: ErasedSubscriber =
            Box::new(move |event: &dyn Event| match event_view::<T>(event) {
                Some(view) => subscriber(view),
                None => Err(EventError::MissingAncestorView {
                    ancestor: type_name::<T>(),
                }),
            });
        self.insert(TypeId::of::<T>(), type_name::<T>(), config, owner, erased)
    }

    fn insert(
        &self,
        event_type: TypeId,
        event_type_name: &'static str,
        config: EventConfig,
        owner: Option<Uuid>,
        subscriber: ErasedSubscriber,
    ) -> SubscriptionHandle {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let subscription = Arc::new(Subscription::new(
            id,
            event_type,
            event_type_name,
            config,
            owner,
            subscriber,
        ));

        let mut state = self.inner.state.write();
        state.by_type.entry(event_type).or_default().push(subscription);
        state.invalidate(event_type);
        trace!(subscription = %id, event_type = event_type_name, "subscribed");

        SubscriptionHandle {
            registry: Arc::downgrade(&self.inner),
            id,
            event_type,
        }
    }

    fn resolve(&self, ty: TypeId, name: &'static str, chain: Vec<TypeId>) -> SubscriptionList {
        let mut state = self.inner.state.write();
        // Another caller may have resolved this type while we waited.
        if let Some(resolution) = state.resolved.get(&ty) {
            return resolution.subscriptions.clone();
        }

        let collected: Vec<Arc<Subscription>> = chain
            .iter()
            .filter_map(|ancestor| state.by_type.get(ancestor))
            .flatten()
            .cloned()
            .collect();
        debug!(
            event_type = name,
            chain = chain.len(),
            matches = collected.len(),
            "resolved subscriptions"
        );

        let subscriptions: SubscriptionList = collected.into();
        state.resolved.insert(
            ty,
            Resolution {
                chain,
                subscriptions: subscriptions.clone(),
            },
        );
        subscriptions
    }

    fn assert_in_scope(&self, ty: TypeId, name: &'static str, ancestors: &[TypeId]) {
        let scope = self.inner.scope;
        if scope.id == root_type_id() || ty == scope.id || ancestors.contains(&scope.id) {
            return;
        }
        panic!(
            "event type `{name}` is not within the `{}` hierarchy this registry is scoped to",
            scope.name,
        );
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Traversal chain for concrete type `T`: `T` itself, its self-described
/// ancestors in declared order (each visited once), the universal root last.
fn ancestor_chain<T: Event>() -> Vec<TypeId> {
    let ancestors = T::ancestors();
    let mut chain = Vec::with_capacity(ancestors.len() + 2);
    chain.push(TypeId::of::<T>());
    for ancestor in ancestors {
        if !chain.contains(&ancestor) {
            chain.push(ancestor);
        }
    }
    let root = root_type_id();
    if !chain.contains(&root) {
        chain.push(root);
    }
    chain
}
