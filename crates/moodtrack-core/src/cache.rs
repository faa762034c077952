//! Process-wide session cache.
//!
//! Holds the current access token for synchronous bearer attachment plus
//! the prefetched entries/profile snapshots used to paint screens before
//! a network round-trip completes. The cache is advisory, never a source
//! of truth: consumers must tolerate staleness until the next
//! authoritative fetch. Racing prefetches are last-write-wins.

use std::sync::{Mutex, PoisonError};

use crate::models::{Entry, UserProfile};

/// Memory-only holder of the session token and prefetched snapshots.
///
/// Lifetime is bound to the authenticated session: primed after login or
/// bootstrap, cleared atomically on logout.
#[derive(Debug, Default)]
pub struct SessionCache {
    access_token: Mutex<Option<String>>,
    entries: Mutex<Option<Vec<Entry>>>,
    profile: Mutex<Option<UserProfile>>,
}

impl SessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn prime_entries(&self, entries: Vec<Entry>) {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = Some(entries);
    }

    #[must_use]
    pub fn cached_entries(&self) -> Option<Vec<Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Upsert a single entry: replace a cached entry with the same id, or
    /// prepend it as the newest one.
    pub fn merge_entry(&self, entry: &Entry) {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = guard.as_mut() else {
            return;
        };
        if let Some(existing) = entries.iter_mut().find(|cached| cached.id == entry.id) {
            *existing = entry.clone();
        } else {
            entries.insert(0, entry.clone());
        }
    }

    /// Patch only the mood field of a cached entry.
    ///
    /// The poller uses this instead of a full-list overwrite so a racing
    /// background prefetch can never be clobbered by stale poll data.
    /// Returns whether a cached entry was updated.
    pub fn patch_mood(&self, entry_id: i64, mood: u8) -> bool {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = guard.as_mut() else {
            return false;
        };
        match entries.iter_mut().find(|cached| cached.id == entry_id) {
            Some(entry) => {
                entry.mood = Some(mood);
                true
            }
            None => false,
        }
    }

    pub fn prime_profile(&self, profile: UserProfile) {
        *self.profile.lock().unwrap_or_else(PoisonError::into_inner) = Some(profile);
    }

    #[must_use]
    pub fn cached_profile(&self) -> Option<UserProfile> {
        self.profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the token and both snapshots. Called on logout.
    pub fn clear(&self) {
        self.set_access_token(None);
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self.profile.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
