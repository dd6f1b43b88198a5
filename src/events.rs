//! Minimal synchronous publish/subscribe used for store-changed and
//! persisted signals. Delivery happens inline, in subscription order, before
//! `publish` returns. There is no queue and no cross-thread delivery.

use tracing::trace;

/// Something that changed in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Hydrated { count: usize },
    Created { id: i64 },
    Updated { id: i64 },
    Toggled { id: i64, is_complete: bool },
    Deleted { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfEvent {
    /// The record store changed; views should re-render.
    StoreChanged(StoreChange),
    /// A write-through finished. Carries the exact payload that was stored.
    Persisted { payload: String },
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ShelfEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ShelfEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: &ShelfEvent) {
        trace!(?event, listeners = self.listeners.len(), "publishing event");
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_run_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&seen);
        bus.subscribe(move |_| first.borrow_mut().push("first"));
        let second = Rc::clone(&seen);
        bus.subscribe(move |_| second.borrow_mut().push("second"));

        bus.publish(&ShelfEvent::StoreChanged(StoreChange::Created { id: 1 }));
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);

        bus.publish(&ShelfEvent::Persisted {
            payload: "[]".into(),
        });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&ShelfEvent::Persisted {
            payload: "[]".into(),
        });

        assert_eq!(*count.borrow(), 1);
    }
}
