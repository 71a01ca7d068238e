//! # Herald
//!
//! An in-process typed event bus: producers post event values, subscribers
//! register against an event type (or any of its ancestors) with
//! per-subscription delivery rules.
//!
//! ## Core Concepts
//!
//! - **Events**: plain values implementing [`Event`], optionally
//!   self-describing an ancestor chain for polymorphic delivery
//! - **Registry**: owns subscriptions, resolves the polymorphic match set
//!   for a concrete type, supports disposal handles and predicate sweeps
//! - **Bus**: filters and dispatches synchronously on the posting thread,
//!   isolating subscriber failures behind an injected exception handler
//! - **Config**: immutable per-subscription preferences — order tag,
//!   cancellation visibility, exact-type matching
//!
//! ## Example
//!
//! ```
//! use std::any::Any;
//! use std::cell::Cell;
//! use herald::{Event, EventBus, EventConfig, EventRegistry};
//!
//! #[derive(Default)]
//! struct Tick {
//!     count: Cell<u32>,
//! }
//!
//! impl Event for Tick {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let registry = EventRegistry::new();
//! let bus = EventBus::with_logging(registry.clone());
//!
//! let handle = registry.subscribe::<Tick, _>(EventConfig::DEFAULTS, |tick| {
//!     tick.count.set(tick.count.get() + 1);
//!     Ok(())
//! });
//!
//! let tick = Tick::default();
//! bus.post(&tick);
//! assert_eq!(tick.count.get(), 1);
//!
//! handle.dispose();
//! bus.post(&tick);
//! assert_eq!(tick.count.get(), 1);
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod registry;

// Re-exports
pub use bus::{EventBus, EventExceptionHandler, LoggingExceptionHandler};
pub use config::EventConfig;
pub use error::{DispatchResult, EventError, SubscriberError};
pub use event::{Cancellable, Event};
pub use registry::{
    EventRegistry, Subscription, SubscriptionHandle, SubscriptionId, SubscriptionList,
};
