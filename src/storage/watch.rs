//! Change notifications for the key-value store
//!
//! Every subscriber gets its own channel and every published event is
//! fanned out to all of them. Senders whose receiver is gone are
//! dropped on the next publish.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

/// A committed change to one key in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    /// Key whose value was written or removed
    pub key: String,
}

/// Fan-out of events to any number of subscribers
pub(crate) struct Fanout<E> {
    subscribers: Mutex<Vec<Sender<E>>>,
}

impl<E: Clone> Fanout<E> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a new subscriber and return its receiving end
    pub(crate) fn subscribe(&self) -> Receiver<E> {
        let (tx, rx) = mpsc::channel();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.push(tx);
        rx
    }

    /// Send an event to all live subscribers
    pub(crate) fn publish(&self, event: E) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(key: &str) -> StoreEvent {
        StoreEvent {
            key: key.to_string(),
        }
    }

    #[test]
    fn test_subscriber_receives_published_event() {
        let fanout = Fanout::new();
        let rx = fanout.subscribe();

        fanout.publish(event("avtotest_users"));

        assert_eq!(rx.try_recv().unwrap().key, "avtotest_users");
    }

    #[test]
    fn test_all_subscribers_receive_event() {
        let fanout = Fanout::new();
        let rx1 = fanout.subscribe();
        let rx2 = fanout.subscribe();

        fanout.publish(event("k"));

        assert_eq!(rx1.try_recv().unwrap().key, "k");
        assert_eq!(rx2.try_recv().unwrap().key, "k");
    }

    #[test]
    fn test_events_arrive_in_publish_order() {
        let fanout = Fanout::new();
        let rx = fanout.subscribe();

        fanout.publish(event("first"));
        fanout.publish(event("second"));

        assert_eq!(rx.try_recv().unwrap().key, "first");
        assert_eq!(rx.try_recv().unwrap().key, "second");
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let fanout = Fanout::new();
        let rx1 = fanout.subscribe();
        let rx2 = fanout.subscribe();
        drop(rx1);

        // First publish notices the dead channel and drops it
        fanout.publish(event("k"));
        assert_eq!(fanout.subscribers.lock().unwrap().len(), 1);

        fanout.publish(event("k2"));
        assert_eq!(rx2.try_recv().unwrap().key, "k");
        assert_eq!(rx2.try_recv().unwrap().key, "k2");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let fanout: Fanout<StoreEvent> = Fanout::new();
        fanout.publish(event("nobody-listening"));
    }
}
