//! Entry mutation event bus.
//!
//! Lets one screen announce "an entry changed" so independently mounted
//! screens can react without prop drilling or a shared store.
//! `publish(Some(entry))` means "merge this entry into your view";
//! `publish(None)` means "something changed, invalidate and refetch".
//! There is no replay: subscribers joining after a publish miss it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::models::Entry;

type Subscriber = Arc<dyn Fn(Option<&Entry>) + Send + Sync>;

#[derive(Default)]
struct SubscriberList {
    next_id: u64,
    subscribers: Vec<(u64, Subscriber)>,
}

/// Ordered publish/subscribe registry for entry mutations.
#[derive(Clone, Default)]
pub struct EntryEvents {
    inner: Arc<Mutex<SubscriberList>>,
}

impl EntryEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Dropping the returned guard unsubscribes.
    #[must_use = "dropping the subscription immediately unsubscribes"]
    pub fn subscribe(
        &self,
        callback: impl Fn(Option<&Entry>) + Send + Sync + 'static,
    ) -> Subscription {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.subscribers.push((id, Arc::new(callback)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Notify every current subscriber, in subscription order.
    ///
    /// The subscriber list is snapshotted before notifying, so a
    /// subscriber that unsubscribes (or subscribes) during delivery never
    /// invalidates the iteration. A panicking subscriber is logged and
    /// does not block delivery to the rest.
    pub fn publish(&self, entry: Option<&Entry>) {
        let snapshot: Vec<Subscriber> = {
            let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            guard
                .subscribers
                .iter()
                .map(|(_, subscriber)| Arc::clone(subscriber))
                .collect()
        };

        for subscriber in snapshot {
            if catch_unwind(AssertUnwindSafe(|| subscriber(entry))).is_err() {
                tracing::error!("entry event subscriber panicked during publish");
            }
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .len()
    }
}

/// Guard for an active subscription.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<SubscriberList>>,
}

impl Subscription {
    /// Remove this subscriber now instead of at drop time.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut guard = registry.lock().unwrap_or_else(PoisonError::into_inner);
            guard.subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(id: i64) -> Entry {
        Entry {
            id,
            title: None,
            content: "test".to_string(),
            mood: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn publish_fans_out_in_subscription_order() {
        let events = EntryEvents::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let _subs: Vec<Subscription> = (0..3)
            .map(|index| {
                let order = Arc::clone(&order);
                events.subscribe(move |published| {
                    let id = published.map(|e| e.id);
                    order.lock().unwrap().push((index, id));
                })
            })
            .collect();

        events.publish(Some(&entry(9)));

        let recorded = order.lock().unwrap().clone();
        assert_eq!(
            recorded,
            vec![(0, Some(9)), (1, Some(9)), (2, Some(9))]
        );
    }

    #[test]
    fn unsubscribed_callback_is_not_notified() {
        let events = EntryEvents::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let keep = {
            let counter = Arc::clone(&counter);
            events.subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        };
        let dropped = {
            let counter = Arc::clone(&counter);
            events.subscribe(move |_| {
                counter.fetch_add(10, Ordering::SeqCst);
            })
        };

        dropped.unsubscribe();
        events.publish(None);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(events.subscriber_count(), 1);
        drop(keep);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn publish_with_none_signals_invalidation() {
        let events = EntryEvents::new();
        let saw_none = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&saw_none);
        let _sub = events.subscribe(move |published| {
            if published.is_none() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        events.publish(None);
        assert_eq!(saw_none.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_block_delivery() {
        let events = EntryEvents::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _first = events.subscribe(|_| panic!("subscriber failure"));
        let _second = {
            let counter = Arc::clone(&counter);
            events.subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        };

        events.publish(Some(&entry(1)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_during_notify_is_safe() {
        let events = EntryEvents::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let subscription = {
            let slot = Arc::clone(&slot);
            events.subscribe(move |_| {
                // Drop our own subscription mid-delivery.
                slot.lock().unwrap().take();
            })
        };
        *slot.lock().unwrap() = Some(subscription);

        events.publish(None);
        assert_eq!(events.subscriber_count(), 0);
        // A second publish must not panic or re-deliver.
        events.publish(None);
    }
}
