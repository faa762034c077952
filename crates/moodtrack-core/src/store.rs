//! Secure token storage interface.
//!
//! The backend hands out a short-lived access token and an optional
//! refresh token. Both must live in a platform secure store; this module
//! only defines the narrow interface the pipeline and session controller
//! consume. Frontends plug in a real keychain-backed implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ApiResult;

/// Which credential a store operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Stable storage key for this token kind.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Access => "moodtrack_access",
            Self::Refresh => "moodtrack_refresh",
        }
    }
}

/// Durable, secure persistence for the token pair.
pub trait TokenStore: Clone + Send + Sync + 'static {
    fn save(&self, kind: TokenKind, value: &str) -> ApiResult<()>;
    fn get(&self, kind: TokenKind) -> ApiResult<Option<String>>;
    fn delete(&self, kind: TokenKind) -> ApiResult<()>;

    /// Remove every stored token. Deleting an absent token is not an error.
    fn clear_all(&self) -> ApiResult<()> {
        self.delete(TokenKind::Access)?;
        self.delete(TokenKind::Refresh)
    }
}

/// In-memory `TokenStore` for tests and environments without a keychain.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<Mutex<HashMap<TokenKind, String>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, kind: TokenKind, value: &str) -> ApiResult<()> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(kind, value.to_string());
        Ok(())
    }

    fn get(&self, kind: TokenKind) -> ApiResult<Option<String>> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(&kind).cloned())
    }

    fn delete(&self, kind: TokenKind) -> ApiResult<()> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(&kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let store = MemoryTokenStore::new();
        store.save(TokenKind::Access, "token-a").unwrap();
        assert_eq!(
            store.get(TokenKind::Access).unwrap().as_deref(),
            Some("token-a")
        );

        store.delete(TokenKind::Access).unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);
    }

    #[test]
    fn clear_all_removes_both_kinds() {
        let store = MemoryTokenStore::new();
        store.save(TokenKind::Access, "a").unwrap();
        store.save(TokenKind::Refresh, "r").unwrap();

        store.clear_all().unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);
        assert_eq!(store.get(TokenKind::Refresh).unwrap(), None);
    }

    #[test]
    fn deleting_absent_token_is_not_an_error() {
        let store = MemoryTokenStore::new();
        assert!(store.delete(TokenKind::Refresh).is_ok());
    }

    #[test]
    fn token_kinds_map_to_distinct_keys() {
        assert_ne!(TokenKind::Access.key(), TokenKind::Refresh.key());
    }
}
