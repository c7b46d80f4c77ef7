//! Multi-subscriber event fan-out.
//!
//! Each publisher owns an [`EventHub`]; listeners either register a callback
//! or take a channel receiver. Events are delivered synchronously on the
//! publishing thread, in publish order, to every live subscriber. Callbacks
//! run without the subscriber list locked, so a callback may subscribe or
//! unsubscribe. Changes made during a publish apply from the next event.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

/// Handle returned by [`EventHub::subscribe_fn`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<Mutex<Box<dyn FnMut(&E) -> bool + Send>>>;

pub struct EventHub<E> {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
    /// Serializes publishers so every subscriber sees one order
    publishing: Mutex<()>,
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
            publishing: Mutex::new(()),
        }
    }
}

impl<E> std::fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}

impl<E: Clone + Send + 'static> EventHub<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered while it returns `true`.
    ///
    /// Callbacks run on the publishing thread. They may subscribe and
    /// unsubscribe, but must not publish to the same hub.
    pub fn subscribe_fn<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&E) -> bool + Send + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: Callback<E> = Arc::new(Mutex::new(Box::new(callback)));
        self.subscribers.lock().push((id, callback));
        id
    }

    /// Receive every future event on a channel. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<E> {
        let (tx, rx) = mpsc::channel();
        self.subscribe_fn(move |event: &E| tx.send(event.clone()).is_ok());
        rx
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    pub fn publish(&self, event: &E) {
        let _order = self.publishing.lock();
        let snapshot: Vec<(SubscriptionId, Callback<E>)> = self
            .subscribers
            .lock()
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();

        let mut finished = Vec::new();
        for (id, callback) in snapshot {
            let mut callback = callback.lock();
            if !(callback.as_mut())(event) {
                finished.push(id);
            }
        }

        if !finished.is_empty() {
            self.subscribers
                .lock()
                .retain(|(id, _)| !finished.contains(id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_sees_events_in_order() {
        let hub = EventHub::new();
        let first = hub.subscribe();
        let second = hub.subscribe();

        for i in 0..3 {
            hub.publish(&i);
        }

        assert_eq!(first.try_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(second.try_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(rx);
        hub.publish(&1u8);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_unsubscribe() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = hub.subscribe_fn(move |e: &u32| {
            sink.lock().push(*e);
            true
        });

        hub.publish(&1);
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.publish(&2);

        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_one_shot_callback() {
        let hub = EventHub::new();
        hub.subscribe_fn(|_: &u32| false);
        hub.publish(&1);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_can_subscribe_and_unsubscribe_during_publish() {
        let hub = Arc::new(EventHub::new());
        let late = Arc::new(Mutex::new(None));

        let inner_hub = Arc::clone(&hub);
        let slot = Arc::clone(&late);
        hub.subscribe_fn(move |e: &u32| {
            if *e == 1 {
                *slot.lock() = Some(inner_hub.subscribe());
                return false;
            }
            true
        });

        let victim = Arc::new(Mutex::new(None));
        let inner_hub = Arc::clone(&hub);
        let target = Arc::clone(&victim);
        hub.subscribe_fn(move |_: &u32| {
            if let Some(id) = target.lock().take() {
                inner_hub.unsubscribe(id);
            }
            true
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        *victim.lock() = Some(hub.subscribe_fn(move |e: &u32| {
            sink.lock().push(*e);
            true
        }));

        hub.publish(&1);
        hub.publish(&2);

        let rx = late.lock().take().expect("first callback ran");
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![2]);
        // removed during the first publish, after that publish was snapshotted
        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(hub.subscriber_count(), 2);
    }
}
