//! Authenticated request pipeline for the MoodTrack backend.
//!
//! Builds and issues HTTP calls, attaches bearer auth from the memory
//! cache (falling back to the secure store), bounds every call with a
//! timeout, and on a 401 performs exactly one silent token refresh plus a
//! single replay before surfacing the failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::cache::SessionCache;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ChatReply, EntriesResponse, Entry, EntryPage, NewEntry, PromptOfDay, SettingsUpdate, TokenPair,
    UserProfile,
};
use crate::store::{TokenKind, TokenStore};
use crate::util::{compact_text, normalize_text_option};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-request pipeline options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Attach a bearer token to the request
    pub auth: bool,
    /// Allow one silent refresh + replay on a 401
    pub retry_on_auth_failure: bool,
}

impl RequestOptions {
    #[must_use]
    pub const fn authenticated() -> Self {
        Self {
            auth: true,
            retry_on_auth_failure: true,
        }
    }

    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            auth: false,
            retry_on_auth_failure: false,
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::authenticated()
    }
}

/// Result of the refresh-then-replay protocol.
enum RefreshOutcome {
    /// Refresh succeeded and the original request was replayed once.
    /// The replayed response may itself be a failure; it is final.
    Recovered(reqwest::Response),
    /// Refresh could not complete; tokens were purged and the caller
    /// falls back to the original failing response.
    Failed,
}

/// HTTP client for the MoodTrack backend.
#[derive(Debug, Clone)]
pub struct ApiClient<S: TokenStore> {
    base_url: String,
    client: Client,
    store: S,
    cache: Arc<SessionCache>,
}

impl<S: TokenStore> ApiClient<S> {
    pub fn new(config: &ClientConfig, store: S, cache: Arc<SessionCache>) -> ApiResult<Self> {
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            store,
            cache,
        })
    }

    /// Returns the normalized API base URL used by this client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// Issue a request against the backend and parse its JSON body.
    ///
    /// A 204 yields `Value::Null`; a non-JSON body is wrapped as
    /// `{"raw": text}` instead of raising a parse error.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        let url = join_url(&self.base_url, path);
        let bearer = if options.auth {
            self.bearer_token()?
        } else {
            None
        };

        let response = self
            .send_once(method.clone(), &url, body, bearer.as_deref())
            .await?;

        if options.auth
            && options.retry_on_auth_failure
            && response.status() == StatusCode::UNAUTHORIZED
        {
            if let RefreshOutcome::Recovered(replayed) =
                self.refresh_and_replay(&method, &url, body).await?
            {
                return parse_response(replayed).await;
            }
        }

        parse_response(response).await
    }

    /// Current bearer token: memory cache first, secure store fallback.
    ///
    /// The store fallback covers a cold process before bootstrap has
    /// primed the memory cache.
    fn bearer_token(&self) -> ApiResult<Option<String>> {
        if let Some(token) = self.cache.access_token() {
            return Ok(Some(token));
        }
        self.store.get(TokenKind::Access)
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let mut request = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Refresh the session once and replay the original request once.
    ///
    /// Errors out of this method come from the replay itself; refresh
    /// failures are downgraded to `RefreshOutcome::Failed` after purging
    /// every locally held token.
    async fn refresh_and_replay(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
    ) -> ApiResult<RefreshOutcome> {
        let Some(access_token) = self.try_refresh().await else {
            return Ok(RefreshOutcome::Failed);
        };
        let replayed = self
            .send_once(method.clone(), url, body, Some(&access_token))
            .await?;
        Ok(RefreshOutcome::Recovered(replayed))
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// On success the rotated pair is persisted and the memory cache
    /// updated. Any failure (missing token, network, non-2xx, malformed
    /// body, storage) purges all tokens and yields `None`, leaving the
    /// session unauthenticated as a side effect.
    async fn try_refresh(&self) -> Option<String> {
        let refresh_token = match self.store.get(TokenKind::Refresh) {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("no refresh token stored, cannot refresh session");
                self.purge_tokens();
                return None;
            }
            Err(error) => {
                tracing::warn!("refresh token lookup failed: {error}");
                self.purge_tokens();
                return None;
            }
        };

        let refresh_url = join_url(&self.base_url, "/auth/refresh");
        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let response = match self.client.post(&refresh_url).json(&payload).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("token refresh request failed: {error}");
                self.purge_tokens();
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(
                "token refresh rejected with HTTP {}",
                response.status().as_u16()
            );
            self.purge_tokens();
            return None;
        }
        let pair = match response.json::<TokenPair>().await {
            Ok(pair) => pair,
            Err(error) => {
                tracing::warn!("malformed token refresh response: {error}");
                self.purge_tokens();
                return None;
            }
        };

        let persisted = self
            .store
            .save(TokenKind::Access, &pair.access_token)
            .and_then(|()| match pair.refresh_token.as_deref() {
                // Refresh tokens may rotate.
                Some(rotated) => self.store.save(TokenKind::Refresh, rotated),
                None => Ok(()),
            });
        if let Err(error) = persisted {
            tracing::warn!("failed to persist refreshed tokens: {error}");
            self.purge_tokens();
            return None;
        }

        self.cache.set_access_token(Some(pair.access_token.clone()));
        Some(pair.access_token)
    }

    fn purge_tokens(&self) {
        if let Err(error) = self.store.clear_all() {
            tracing::warn!("failed to clear token store: {error}");
        }
        self.cache.set_access_token(None);
    }
}

// ---------------------------------------------------------------------------
// Typed endpoints
// ---------------------------------------------------------------------------

impl<S: TokenStore> ApiClient<S> {
    /// `POST /auth/login`
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenPair> {
        validate_credentials(username, password)?;
        let payload = serde_json::json!({ "username": username, "password": password });
        let value = self
            .request(
                Method::POST,
                "/auth/login",
                Some(&payload),
                RequestOptions::unauthenticated(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `GET /entries?skip=&limit=`
    pub async fn entries(&self, skip: u64, limit: u64) -> ApiResult<EntryPage> {
        let value = self
            .request(
                Method::GET,
                &format!("/entries?skip={skip}&limit={limit}"),
                None,
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value::<EntriesResponse>(value)?.into())
    }

    /// `GET /entries/{id}`
    pub async fn entry(&self, entry_id: i64) -> ApiResult<Entry> {
        let value = self
            .request(
                Method::GET,
                &format!("/entries/{entry_id}"),
                None,
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `POST /entries`
    ///
    /// Empty content is rejected client-side before any call is issued.
    pub async fn create_entry(&self, draft: &NewEntry) -> ApiResult<Entry> {
        let Some(content) = normalize_text_option(Some(draft.content.clone())) else {
            return Err(ApiError::InvalidInput(
                "Entry content must not be empty".to_string(),
            ));
        };
        let payload = serde_json::to_value(NewEntry {
            title: draft.title.clone(),
            content,
        })?;
        let value = self
            .request(
                Method::POST,
                "/entries",
                Some(&payload),
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `GET /users/me`
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        let value = self
            .request(Method::GET, "/users/me", None, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `PATCH /me/settings`
    pub async fn update_settings(&self, update: &SettingsUpdate) -> ApiResult<UserProfile> {
        if update.is_empty() {
            return Err(ApiError::InvalidInput(
                "Settings update has no fields to change".to_string(),
            ));
        }
        let payload = serde_json::to_value(update)?;
        let value = self
            .request(
                Method::PATCH,
                "/me/settings",
                Some(&payload),
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `POST /chatbot/send_message`
    pub async fn send_chat_message(&self, message: &str, thread_id: &str) -> ApiResult<ChatReply> {
        let Some(message) = normalize_text_option(Some(message.to_string())) else {
            return Err(ApiError::InvalidInput(
                "Chat message must not be empty".to_string(),
            ));
        };
        let payload = serde_json::json!({ "message": message, "thread_id": thread_id });
        let value = self
            .request(
                Method::POST,
                "/chatbot/send_message",
                Some(&payload),
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `GET /chatbot/prompt_of_day`
    pub async fn prompt_of_day(&self) -> ApiResult<PromptOfDay> {
        let value = self
            .request(
                Method::GET,
                "/chatbot/prompt_of_day",
                None,
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `GET /chatbot/thread_id`
    pub async fn thread_id(&self) -> ApiResult<Option<String>> {
        let value = self
            .request(
                Method::GET,
                "/chatbot/thread_id",
                None,
                RequestOptions::default(),
            )
            .await?;
        let parsed: ThreadIdResponse = serde_json::from_value(value)?;
        Ok(normalize_text_option(parsed.thread_id))
    }

    /// `POST /chatbot/thread_id`
    pub async fn create_thread_id(&self) -> ApiResult<Option<String>> {
        let value = self
            .request(
                Method::POST,
                "/chatbot/thread_id",
                None,
                RequestOptions::default(),
            )
            .await?;
        let parsed: ThreadIdResponse = serde_json::from_value(value)?;
        Ok(normalize_text_option(parsed.thread_id))
    }
}

/// Seam for fetching a single entry, so the mood poller is testable
/// without a live backend.
pub trait EntryFetcher: Clone + Send + Sync + 'static {
    fn fetch_entry(&self, entry_id: i64) -> impl Future<Output = ApiResult<Entry>> + Send;
}

impl<S: TokenStore> EntryFetcher for ApiClient<S> {
    fn fetch_entry(&self, entry_id: i64) -> impl Future<Output = ApiResult<Entry>> + Send {
        self.entry(entry_id)
    }
}

#[derive(Debug, Deserialize)]
struct ThreadIdResponse {
    #[serde(default)]
    thread_id: Option<String>,
}

/// Join a base URL and a path with exactly one separating slash.
fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (false, false) => format!("{base}/{path}"),
        (true, true) => format!("{base}{}", &path[1..]),
        _ => format!("{base}{path}"),
    }
}

async fn parse_response(response: reqwest::Response) -> ApiResult<Value> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }

    let text = response.text().await?;
    let payload = parse_json_lenient(&text);

    if !status.is_success() {
        let message = error_message(&payload, status);
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    Ok(payload)
}

/// Parse a body as JSON, wrapping non-JSON text as `{"raw": text}`.
fn parse_json_lenient(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw": text }))
}

/// Best-effort error message extraction from a failure body.
///
/// The backend reports failures as FastAPI-style `{"detail": ...}`;
/// `message`/`error` cover proxies in front of it.
fn error_message(payload: &Value, status: StatusCode) -> String {
    for key in ["detail", "message", "error"] {
        if let Some(text) = payload.get(key).and_then(Value::as_str) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    // Plain-text failure bodies were wrapped as {"raw": text}.
    if let Some(raw) = payload.get("raw").and_then(Value::as_str) {
        let compacted = compact_text(raw);
        if !compacted.is_empty() {
            return compacted;
        }
    }
    format!("HTTP {}", status.as_u16())
}

fn validate_credentials(username: &str, password: &str) -> ApiResult<()> {
    if username.trim().is_empty() {
        return Err(ApiError::InvalidInput("Username is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(ApiError::InvalidInput("Password is required".to_string()));
    }
    Ok(())
}
