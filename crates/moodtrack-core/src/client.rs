//! Owned top-level context wiring the session layer together.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::SessionController;
use crate::cache::SessionCache;
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::events::EntryEvents;
use crate::poller::MoodPoller;
use crate::store::TokenStore;

/// One fully wired client: cache, API pipeline, session controller,
/// event bus, and mood poller, all sharing the same state.
///
/// Everything hangs off this owned value; there are no process globals,
/// so tests and embedders can run several independent clients side by
/// side.
#[derive(Clone)]
pub struct MoodTrackClient<S: TokenStore> {
    cache: Arc<SessionCache>,
    api: ApiClient<S>,
    session: SessionController<S>,
    events: EntryEvents,
    poller: MoodPoller<ApiClient<S>>,
}

impl<S: TokenStore> MoodTrackClient<S> {
    pub fn new(config: &ClientConfig, store: S) -> ApiResult<Self> {
        let cache = Arc::new(SessionCache::new());
        let api = ApiClient::new(config, store, Arc::clone(&cache))?;
        let session = SessionController::new(api.clone());
        let events = EntryEvents::new();
        let poller = MoodPoller::new(api.clone(), Arc::clone(&cache), events.clone());
        Ok(Self {
            cache,
            api,
            session,
            events,
            poller,
        })
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient<S> {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &SessionController<S> {
        &self.session
    }

    #[must_use]
    pub const fn events(&self) -> &EntryEvents {
        &self.events
    }

    #[must_use]
    pub const fn poller(&self) -> &MoodPoller<ApiClient<S>> {
        &self.poller
    }
}
