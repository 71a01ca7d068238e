//! Subscription registry.
//!
//! The registry owns all subscriptions, grouped by the event type they were
//! registered against, and resolves the full polymorphic subscription set
//! for any concrete event type:
//! - Registration returns a disposal handle; disposal is idempotent.
//! - Resolution walks the concrete type and its self-described ancestor
//!   chain, visiting each type once, and caches the result until a mutation
//!   touches a type in the chain.
//! - Bulk removal sweeps a predicate over every live subscription.
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use herald::{Event, EventConfig, EventRegistry};
//!
//! struct Tick;
//!
//! impl Event for Tick {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let registry = EventRegistry::new();
//! assert!(!registry.subscribed::<Tick>());
//!
//! let handle = registry.subscribe::<Tick, _>(EventConfig::DEFAULTS, |_tick| Ok(()));
//! assert!(registry.subscribed::<Tick>());
//!
//! handle.dispose();
//! assert!(!registry.subscribed::<Tick>());
//! ```

mod manager;
mod types;

pub use manager::EventRegistry;
pub use types::{Subscription, SubscriptionHandle, SubscriptionId, SubscriptionList};
