//! Authenticated session lifecycle.
//!
//! Owns the unauthenticated/authenticated state machine and orchestrates
//! the login/logout side effects: token persistence, cache priming, and
//! chat thread provisioning.

use std::sync::{Arc, Mutex, PoisonError};

use crate::api::ApiClient;
use crate::cache::SessionCache;
use crate::error::{ApiError, ApiResult};
use crate::store::{TokenKind, TokenStore};

/// Chat thread identifiers carry this fixed tag.
pub const THREAD_ID_PREFIX: &str = "thread_";

/// How many entries the login/bootstrap prefetch pulls.
const PREFETCH_PAGE_SIZE: u64 = 20;

/// Whether a thread identifier is usable: non-empty and correctly tagged.
#[must_use]
pub fn is_valid_thread_id(value: &str) -> bool {
    let value = value.trim();
    value.len() > THREAD_ID_PREFIX.len() && value.starts_with(THREAD_ID_PREFIX)
}

/// Authentication state of the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Current identity exposed to the UI tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub state: SessionState,
    pub username: Option<String>,
    pub thread_id: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }
}

/// Owns the session state machine. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionController<S: TokenStore> {
    api: ApiClient<S>,
    session: Arc<Mutex<Session>>,
}

impl<S: TokenStore> SessionController<S> {
    #[must_use]
    pub fn new(api: ApiClient<S>) -> Self {
        Self {
            api,
            session: Arc::new(Mutex::new(Session::default())),
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    fn cache(&self) -> &Arc<SessionCache> {
        self.api.cache()
    }

    fn with_session(&self, mutate: impl FnOnce(&mut Session)) {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        mutate(&mut guard);
    }

    /// Restore the session at process start from whatever the secure
    /// store holds.
    ///
    /// When an access token exists the state flips to authenticated
    /// immediately (the UI unlocks before data loads) and snapshot
    /// prefetch plus thread provisioning continue as a detached
    /// best-effort task whose failures never revert the state.
    ///
    /// Returns whether a stored session was found.
    pub async fn bootstrap(&self) -> ApiResult<bool> {
        let Some(access_token) = self.api.store().get(TokenKind::Access)? else {
            return Ok(false);
        };

        self.cache().set_access_token(Some(access_token));
        self.with_session(|session| session.state = SessionState::Authenticated);

        let controller = self.clone();
        tokio::spawn(async move {
            let username = controller.prefetch_snapshots().await;
            controller.with_session(|session| session.username = username);
            controller.provision_thread().await;
        });

        Ok(true)
    }

    /// Log in and prime the session.
    ///
    /// The snapshot prefetch blocks the state flip but its failure does
    /// not abort login; it only leaves the cache unprimed and falls back
    /// to the submitted username. Thread provisioning is best-effort.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        self.with_session(|session| session.state = SessionState::Authenticating);

        let pair = match self.api.login(username, password).await {
            Ok(pair) => pair,
            Err(error) => {
                self.with_session(|session| session.state = SessionState::Unauthenticated);
                return Err(error);
            }
        };

        self.api.store().save(TokenKind::Access, &pair.access_token)?;
        if let Some(refresh_token) = pair.refresh_token.as_deref() {
            self.api.store().save(TokenKind::Refresh, refresh_token)?;
        }
        self.cache().set_access_token(Some(pair.access_token.clone()));

        let fetched_username = self.prefetch_snapshots().await;
        self.with_session(|session| {
            session.username = Some(fetched_username.unwrap_or_else(|| username.to_string()));
        });

        self.provision_thread().await;

        self.with_session(|session| session.state = SessionState::Authenticated);
        Ok(())
    }

    /// Tear the session down unconditionally.
    ///
    /// The store purge happens before the state flip so a crash
    /// mid-logout can never leave authenticated UI with cleared tokens.
    pub async fn logout(&self) {
        if let Err(error) = self.api.store().clear_all() {
            tracing::warn!("failed to purge token store on logout: {error}");
        }
        self.cache().clear();
        self.with_session(|session| *session = Session::default());
    }

    /// Fetch entries and profile in parallel to prime the cache.
    ///
    /// Returns the fetched username when the profile call succeeded.
    async fn prefetch_snapshots(&self) -> Option<String> {
        let (entries, profile) = tokio::join!(
            self.api.entries(0, PREFETCH_PAGE_SIZE),
            self.api.profile()
        );

        match entries {
            Ok(page) => self.cache().prime_entries(page.items),
            Err(error) => tracing::warn!("entries prefetch failed: {error}"),
        }

        match profile {
            Ok(profile) => {
                let username = profile.username.clone();
                self.cache().prime_profile(profile);
                Some(username)
            }
            Err(error) => {
                tracing::warn!("profile prefetch failed: {error}");
                None
            }
        }
    }

    /// Best-effort thread provisioning; failure leaves chat disabled but
    /// never blocks authentication.
    async fn provision_thread(&self) {
        match self.ensure_thread_id().await {
            Ok(thread_id) => {
                self.with_session(|session| session.thread_id = Some(thread_id));
            }
            Err(error) => {
                tracing::warn!("chat thread provisioning failed: {error}");
                self.with_session(|session| session.thread_id = None);
            }
        }
    }

    /// Obtain a usable chat thread id.
    ///
    /// Checks session memory, then the backend, and only creates a new
    /// thread when neither holds a well-formed id. Idempotent: once a
    /// valid thread exists, repeated calls never issue a create.
    pub async fn ensure_thread_id(&self) -> ApiResult<String> {
        let known = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .thread_id
            .clone();
        if let Some(existing) = known {
            if is_valid_thread_id(&existing) {
                return Ok(existing);
            }
        }

        if let Some(existing) = self.api.thread_id().await? {
            if is_valid_thread_id(&existing) {
                return Ok(existing);
            }
            tracing::warn!("backend returned malformed thread id, creating a new one");
        }

        match self.api.create_thread_id().await? {
            Some(created) if is_valid_thread_id(&created) => Ok(created),
            Some(created) => Err(ApiError::ThreadProvisioning(format!(
                "created thread id is malformed: {created}"
            ))),
            None => Err(ApiError::ThreadProvisioning(
                "create response did not include a thread id".to_string(),
            )),
        }
    }
}
