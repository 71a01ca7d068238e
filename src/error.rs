//! Error types for event dispatch.

use thiserror::Error;

/// Arbitrary failure payload returned by a subscriber.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by subscribers.
pub type DispatchResult = std::result::Result<(), EventError>;

/// Failure surfaced during dispatch of a single event to a single
/// subscription. These are never raised to the caller of `post`; the bus
/// forwards them to the injected exception handler.
#[derive(Debug, Error)]
pub enum EventError {
    /// A subscriber failed while handling an event.
    #[error("subscriber failed: {0}")]
    Subscriber(#[source] SubscriberError),

    /// The posted event listed `ancestor` in its ancestor chain but
    /// provided no view for it, so a subscriber registered against that
    /// ancestor could not be invoked.
    #[error("event provides no view for declared ancestor `{ancestor}`")]
    MissingAncestorView { ancestor: &'static str },
}

impl EventError {
    /// Wraps an arbitrary error as a subscriber failure.
    pub fn subscriber(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        EventError::Subscriber(Box::new(err))
    }

    /// Creates a subscriber failure from a message.
    pub fn msg(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        EventError::Subscriber(msg.into())
    }
}
