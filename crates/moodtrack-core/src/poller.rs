//! Background reconciliation of server-computed mood scores.
//!
//! A freshly created entry comes back with `mood == None` while the
//! backend scores it asynchronously. The poller re-fetches each such
//! entry on a bounded backoff schedule until the score appears, then
//! patches the cache and announces the entry on the event bus.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::EntryFetcher;
use crate::cache::SessionCache;
use crate::events::EntryEvents;

const MAX_ATTEMPTS: u32 = 12;
const BASE_DELAY_MS: u64 = 1200;
const BACKOFF_STEP_MS: u64 = 800;
const MAX_DELAY_MS: u64 = 5000;

/// Delay before the given 1-based attempt.
#[must_use]
pub fn poll_delay(attempt: u32) -> Duration {
    let millis = BASE_DELAY_MS + u64::from(attempt.saturating_sub(1)) * BACKOFF_STEP_MS;
    Duration::from_millis(millis.min(MAX_DELAY_MS))
}

/// Terminal state of a per-entry polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    /// The server produced a score within the attempt budget.
    Resolved,
    /// The attempt budget ran out; the entry keeps `mood == None`
    /// until a manual refresh.
    Exhausted,
}

/// Per-entry mood polling with an indexed task table.
///
/// At most one active task exists per entry id; watching an id that is
/// already being polled is a no-op. All pending tasks must be cancelled
/// on view teardown via [`MoodPoller::cancel_all`].
#[derive(Clone)]
pub struct MoodPoller<F: EntryFetcher> {
    fetcher: F,
    cache: Arc<SessionCache>,
    events: EntryEvents,
    active: Arc<Mutex<HashMap<i64, JoinHandle<()>>>>,
}

impl<F: EntryFetcher> MoodPoller<F> {
    #[must_use]
    pub fn new(fetcher: F, cache: Arc<SessionCache>, events: EntryEvents) -> Self {
        Self {
            fetcher,
            cache,
            events,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start polling an entry until its mood resolves.
    ///
    /// No-op when a poll for this entry is already in flight.
    pub fn watch(&self, entry_id: i64) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = active.get(&entry_id) {
            if !handle.is_finished() {
                return;
            }
        }

        let poller = self.clone();
        let handle = tokio::spawn(async move {
            let outcome = poller.run(entry_id).await;
            tracing::debug!("mood poll for entry {entry_id} finished: {outcome:?}");
            poller
                .active
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&entry_id);
        });
        active.insert(entry_id, handle);
    }

    /// Whether a poll for this entry is currently pending.
    #[must_use]
    pub fn is_watching(&self, entry_id: i64) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entry_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel the pending poll for one entry, if any.
    pub fn cancel(&self, entry_id: i64) {
        if let Some(handle) = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&entry_id)
        {
            handle.abort();
        }
    }

    /// Cancel every pending poll. Called on view teardown.
    pub fn cancel_all(&self) {
        let handles: Vec<JoinHandle<()>> = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        for handle in handles {
            handle.abort();
        }
    }

    async fn run(&self, entry_id: i64) -> PollOutcome {
        for attempt in 1..=MAX_ATTEMPTS {
            tokio::time::sleep(poll_delay(attempt)).await;

            match self.fetcher.fetch_entry(entry_id).await {
                Ok(entry) => {
                    if let Some(mood) = entry.mood {
                        // Targeted patch: never overwrite the whole list,
                        // so a racing prefetch cannot be clobbered.
                        self.cache.patch_mood(entry_id, mood);
                        self.events.publish(Some(&entry));
                        return PollOutcome::Resolved;
                    }
                }
                Err(error) => {
                    tracing::debug!("mood poll fetch failed for entry {entry_id}: {error}");
                }
            }
        }
        PollOutcome::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::{ApiError, ApiResult};
    use crate::models::Entry;

    /// Fetcher that reports `mood == None` until a configured attempt.
    #[derive(Clone)]
    struct ScriptedFetcher {
        calls: Arc<AtomicUsize>,
        resolve_on: Option<usize>,
        mood: u8,
    }

    impl ScriptedFetcher {
        fn new(resolve_on: Option<usize>, mood: u8) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                resolve_on,
                mood,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EntryFetcher for ScriptedFetcher {
        fn fetch_entry(&self, entry_id: i64) -> impl Future<Output = ApiResult<Entry>> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let mood = (self.resolve_on == Some(call)).then_some(self.mood);
            async move {
                Ok(Entry {
                    id: entry_id,
                    title: None,
                    content: "scripted".to_string(),
                    mood,
                    created_at: Utc::now(),
                })
            }
        }
    }

    /// Fetcher whose every call fails.
    #[derive(Clone)]
    struct FailingFetcher {
        calls: Arc<AtomicUsize>,
    }

    impl EntryFetcher for FailingFetcher {
        fn fetch_entry(&self, _entry_id: i64) -> impl Future<Output = ApiResult<Entry>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Err(ApiError::Server {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        }
    }

    fn poller_with<F: EntryFetcher>(fetcher: F) -> (MoodPoller<F>, Arc<SessionCache>) {
        let cache = Arc::new(SessionCache::new());
        let poller = MoodPoller::new(fetcher, Arc::clone(&cache), EntryEvents::new());
        (poller, cache)
    }

    fn pending_entry(id: i64) -> Entry {
        Entry {
            id,
            title: None,
            content: "pending".to_string(),
            mood: None,
            created_at: Utc::now(),
        }
    }

    async fn wait_until_idle<F: EntryFetcher>(poller: &MoodPoller<F>, entry_id: i64) {
        while poller.is_watching(entry_id) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[test]
    fn delay_schedule_is_bounded() {
        assert_eq!(poll_delay(1), Duration::from_millis(1200));
        assert_eq!(poll_delay(2), Duration::from_millis(2000));
        assert_eq!(poll_delay(5), Duration::from_millis(4400));
        assert_eq!(poll_delay(6), Duration::from_millis(5000));
        assert_eq!(poll_delay(12), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn convergence_stops_at_the_resolving_fetch() {
        let fetcher = ScriptedFetcher::new(Some(3), 4);
        let (poller, cache) = poller_with(fetcher.clone());
        cache.prime_entries(vec![pending_entry(7)]);

        poller.watch(7);
        wait_until_idle(&poller, 7).await;

        assert_eq!(fetcher.call_count(), 3);
        let cached = cache.cached_entries().unwrap();
        assert_eq!(cached[0].mood, Some(4));
        assert!(!poller.is_watching(7));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_stops_after_twelve_attempts() {
        let fetcher = ScriptedFetcher::new(None, 0);
        let (poller, cache) = poller_with(fetcher.clone());
        cache.prime_entries(vec![pending_entry(7)]);

        poller.watch(7);
        wait_until_idle(&poller, 7).await;

        assert_eq!(fetcher.call_count(), 12);
        assert_eq!(cache.cached_entries().unwrap()[0].mood, None);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_count_as_misses() {
        let fetcher = FailingFetcher {
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let calls = Arc::clone(&fetcher.calls);
        let (poller, _cache) = poller_with(fetcher);

        poller.watch(7);
        wait_until_idle(&poller, 7).await;

        assert_eq!(calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_watch_is_a_noop() {
        let fetcher = ScriptedFetcher::new(Some(3), 5);
        let (poller, cache) = poller_with(fetcher.clone());
        cache.prime_entries(vec![pending_entry(7)]);

        poller.watch(7);
        poller.watch(7);
        wait_until_idle(&poller, 7).await;

        // A second watch while polling must not double the fetches.
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn resolution_publishes_the_entry_on_the_bus() {
        let fetcher = ScriptedFetcher::new(Some(1), 2);
        let cache = Arc::new(SessionCache::new());
        let events = EntryEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = events.subscribe(move |published| {
            if let Some(entry) = published {
                sink.lock().unwrap().push((entry.id, entry.mood));
            }
        });

        let poller = MoodPoller::new(fetcher, cache, events);
        poller.watch(9);
        wait_until_idle(&poller, 9).await;

        assert_eq!(seen.lock().unwrap().clone(), vec![(9, Some(2))]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_aborts_pending_polls() {
        let fetcher = ScriptedFetcher::new(None, 0);
        let (poller, _cache) = poller_with(fetcher.clone());

        poller.watch(1);
        poller.watch(2);
        poller.cancel_all();

        // Give aborted tasks a tick to settle.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!poller.is_watching(1));
        assert!(!poller.is_watching(2));
        // Cancellation happened before the first delay elapsed.
        assert_eq!(fetcher.call_count(), 0);
    }
}
