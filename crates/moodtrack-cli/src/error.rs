use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] moodtrack_core::ApiError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No entry content provided")]
    EmptyContent,
    #[error("No chat message provided")]
    EmptyMessage,
    #[error("Not signed in. Run `moodtrack login` first.")]
    NotSignedIn,
}
