//! Per-subscription delivery configuration.

use serde::{Deserialize, Serialize};

fn default_accepts_cancelled() -> bool {
    EventConfig::DEFAULT_ACCEPTS_CANCELLED
}

/// Immutable delivery preferences for one subscription.
///
/// A config is a plain value: the `with_*` methods return a new value with
/// one field replaced and never affect holders of a prior copy. Fields left
/// out of a serialized form fall back to the documented defaults.
///
/// # Example
///
/// ```
/// use herald::EventConfig;
///
/// let config = EventConfig::DEFAULTS.with_order(10).with_exact(true);
/// assert_eq!(config.order(), 10);
/// assert!(config.exact());
/// assert!(config.accepts_cancelled());
///
/// // The shared defaults are untouched.
/// assert_eq!(EventConfig::DEFAULTS.order(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default)]
    order: i32,
    #[serde(default = "default_accepts_cancelled")]
    accepts_cancelled: bool,
    #[serde(default)]
    exact: bool,
}

impl EventConfig {
    /// Default post order.
    pub const DEFAULT_ORDER: i32 = 0;
    /// By default, cancelled events are still delivered.
    pub const DEFAULT_ACCEPTS_CANCELLED: bool = true;
    /// By default, subtypes of the declared event type are accepted.
    pub const DEFAULT_EXACT: bool = false;

    /// Shared default configuration.
    pub const DEFAULTS: EventConfig = EventConfig::new(
        Self::DEFAULT_ORDER,
        Self::DEFAULT_ACCEPTS_CANCELLED,
        Self::DEFAULT_EXACT,
    );

    /// Creates a configuration. Any order value is legal.
    pub const fn new(order: i32, accepts_cancelled: bool, exact: bool) -> Self {
        Self {
            order,
            accepts_cancelled,
            exact,
        }
    }

    /// The post order tag.
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Whether cancelled events are delivered.
    pub const fn accepts_cancelled(&self) -> bool {
        self.accepts_cancelled
    }

    /// Whether only the exact declared event type is accepted.
    pub const fn exact(&self) -> bool {
        self.exact
    }

    /// Returns a copy with the post order replaced.
    pub const fn with_order(self, order: i32) -> Self {
        Self { order, ..self }
    }

    /// Returns a copy with cancelled-event acceptance replaced.
    pub const fn with_accepts_cancelled(self, accepts_cancelled: bool) -> Self {
        Self {
            accepts_cancelled,
            ..self
        }
    }

    /// Returns a copy with exact-type matching replaced.
    pub const fn with_exact(self, exact: bool) -> Self {
        Self { exact, ..self }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self::DEFAULTS
    }
}
