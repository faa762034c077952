//! Keychain-backed token persistence for the CLI.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use moodtrack_core::{ApiError, ApiResult, TokenKind, TokenStore};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "moodtrack-cli";

/// `TokenStore` backed by the OS keychain. Tests swap in a process-wide
/// in-memory map so they never touch real credentials.
#[derive(Debug, Clone, Default)]
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<&'static str, String>> {
        static STORE: OnceLock<Mutex<HashMap<&'static str, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(kind: TokenKind) -> ApiResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, kind.key())
            .map_err(|error| ApiError::SecureStorage(error.to_string()))
    }
}

impl TokenStore for KeyringTokenStore {
    #[cfg(not(test))]
    fn save(&self, kind: TokenKind, value: &str) -> ApiResult<()> {
        Self::entry(kind)?
            .set_password(value)
            .map_err(|error| ApiError::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save(&self, kind: TokenKind, value: &str) -> ApiResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| ApiError::SecureStorage(error.to_string()))?;
        guard.insert(kind.key(), value.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn get(&self, kind: TokenKind) -> ApiResult<Option<String>> {
        match Self::entry(kind)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(ApiError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn get(&self, kind: TokenKind) -> ApiResult<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| ApiError::SecureStorage(error.to_string()))?;
        Ok(guard.get(kind.key()).cloned())
    }

    #[cfg(not(test))]
    fn delete(&self, kind: TokenKind) -> ApiResult<()> {
        match Self::entry(kind)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(ApiError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn delete(&self, kind: TokenKind) -> ApiResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| ApiError::SecureStorage(error.to_string()))?;
        guard.remove(kind.key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Token kinds share one process-wide test map, so this single test
    // covers the whole lifecycle to avoid cross-test interference.
    #[test]
    fn in_memory_lifecycle() {
        let store = KeyringTokenStore::new();

        store.save(TokenKind::Access, "access-1").unwrap();
        store.save(TokenKind::Refresh, "refresh-1").unwrap();
        assert_eq!(
            store.get(TokenKind::Access).unwrap().as_deref(),
            Some("access-1")
        );

        store.delete(TokenKind::Access).unwrap();
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);
        assert!(store.delete(TokenKind::Access).is_ok());

        store.clear_all().unwrap();
        assert_eq!(store.get(TokenKind::Refresh).unwrap(), None);
    }
}
