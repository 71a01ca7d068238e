//! Event trait and optional event capabilities.
//!
//! Rust has no class inheritance, so event hierarchies are self-described:
//! each event type reports the [`TypeId`]s of its ancestor event types and
//! can lend itself out as a view of any of them. The registry uses the
//! ancestor chain to resolve polymorphic subscriptions; the bus uses the
//! views to hand a typed reference to subscribers registered against an
//! ancestor.
//!
//! The idiomatic way to build a hierarchy is composition: a child event
//! embeds its parent and returns a reference to it from
//! [`Event::as_ancestor`], delegating unknown ids further down the chain.
//!
//! # Example
//!
//! ```
//! use std::any::{Any, TypeId};
//! use herald::Event;
//!
//! #[derive(Default)]
//! struct InputEvent {
//!     handled: std::cell::Cell<bool>,
//! }
//!
//! impl Event for InputEvent {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! #[derive(Default)]
//! struct ClickEvent {
//!     base: InputEvent,
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Event for ClickEvent {
//!     fn ancestors() -> Vec<TypeId> {
//!         let mut chain = vec![TypeId::of::<InputEvent>()];
//!         chain.extend(InputEvent::ancestors());
//!         chain
//!     }
//!
//!     fn as_ancestor(&self, ancestor: TypeId) -> Option<&dyn Event> {
//!         if ancestor == TypeId::of::<InputEvent>() {
//!             return Some(&self.base);
//!         }
//!         self.base.as_ancestor(ancestor)
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//! ```

use std::any::{Any, TypeId};

/// An application-defined value posted for delivery to subscribers.
///
/// The default implementations describe a standalone event type: no
/// ancestors, no cancellation capability.
pub trait Event: Any {
    /// Type ids of this event type's ancestors, nearest first.
    ///
    /// The chain must be transitive: a type reachable through several levels
    /// (or several paths) of the hierarchy is listed here directly.
    /// Duplicates are tolerated; the registry visits each type once.
    /// `Self` is never listed.
    fn ancestors() -> Vec<TypeId>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Borrows this event as one of its declared ancestor types.
    ///
    /// Must return a view for every id listed by [`Event::ancestors`];
    /// otherwise subscribers registered against that ancestor receive a
    /// [`MissingAncestorView`](crate::EventError::MissingAncestorView)
    /// dispatch failure instead of the event.
    fn as_ancestor(&self, ancestor: TypeId) -> Option<&dyn Event> {
        let _ = ancestor;
        None
    }

    /// Cancellation capability of this event, if it carries one.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }

    /// Downcast access to the concrete event value.
    fn as_any(&self) -> &dyn Any;
}

/// Optional capability for events that can report a cancelled state.
///
/// The bus probes for this capability through [`Event::as_cancellable`];
/// events without it are never rejected on cancellation grounds.
pub trait Cancellable {
    /// Whether the event is currently cancelled.
    fn cancelled(&self) -> bool;
}

/// Type id of the universal root, matched by every posted event.
///
/// Subscriptions registered against the root (see
/// [`EventRegistry::subscribe_any`](crate::EventRegistry::subscribe_any))
/// receive all events; the root is otherwise excluded from resolution.
pub(crate) fn root_type_id() -> TypeId {
    TypeId::of::<dyn Event>()
}

/// Resolves the `T` view of a posted event: the event itself when its
/// runtime type is `T`, otherwise the ancestor view the event provides.
pub(crate) fn event_view<T: Event>(event: &dyn Event) -> Option<&T> {
    if let Some(direct) = event.as_any().downcast_ref::<T>() {
        return Some(direct);
    }
    event
        .as_ancestor(TypeId::of::<T>())
        .and_then(|view| view.as_any().downcast_ref::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Root;

    impl Event for Root {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Child {
        base: Root,
    }

    impl Event for Child {
        fn ancestors() -> Vec<TypeId> {
            vec![TypeId::of::<Root>()]
        }

        fn as_ancestor(&self, ancestor: TypeId) -> Option<&dyn Event> {
            if ancestor == TypeId::of::<Root>() {
                return Some(&self.base);
            }
            None
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_view_of_own_type() {
        let event = Root;
        assert!(event_view::<Root>(&event).is_some());
    }

    #[test]
    fn test_view_of_ancestor() {
        let event = Child { base: Root };
        assert!(event_view::<Root>(&event).is_some());
        assert!(event_view::<Child>(&event).is_some());
    }

    #[test]
    fn test_view_of_unrelated_type() {
        let event = Root;
        assert!(event_view::<Child>(&event).is_none());
    }

    #[test]
    fn test_default_capabilities() {
        let event = Root;
        assert!(event.as_cancellable().is_none());
        assert!(event.as_ancestor(TypeId::of::<Child>()).is_none());
        assert!(Root::ancestors().is_empty());
    }
}
