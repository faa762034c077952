//! moodtrack-core - Session and data-consistency layer for MoodTrack
//!
//! This crate contains the authenticated request pipeline, session
//! lifecycle, in-memory cache, entry event bus, and mood-resolution
//! poller shared by every MoodTrack frontend.

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod poller;
pub mod store;
pub mod util;

pub use api::{ApiClient, EntryFetcher, RequestOptions};
pub use auth::{Session, SessionController, SessionState};
pub use cache::SessionCache;
pub use client::MoodTrackClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use events::{EntryEvents, Subscription};
pub use models::{Entry, EntryPage, NewEntry, TokenPair, UserProfile};
pub use poller::MoodPoller;
pub use store::{MemoryTokenStore, TokenKind, TokenStore};
