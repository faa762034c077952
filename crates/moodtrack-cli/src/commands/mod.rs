pub mod auth_cmd;
pub mod chat;
pub mod completions;
pub mod config_cmd;
pub mod entries;
pub mod profile;

use moodtrack_core::{MoodTrackClient, TokenKind, TokenStore};

use crate::error::CliError;
use crate::token_store::KeyringTokenStore;

pub type Client = MoodTrackClient<KeyringTokenStore>;

/// Commands that talk to authenticated endpoints fail fast with a
/// sign-in hint instead of a server 401.
pub fn require_session(client: &Client) -> Result<(), CliError> {
    match client.api().store().get(TokenKind::Access)? {
        Some(_) => Ok(()),
        None => Err(CliError::NotSignedIn),
    }
}
