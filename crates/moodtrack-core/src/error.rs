//! Error types for moodtrack-core

use thiserror::Error;

/// Result type alias using moodtrack-core's `ApiError`
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur in moodtrack-core operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connectivity or timeout failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401 that survived the refresh-and-replay protocol
    #[error("Authorization failed: {message} ({status})")]
    Unauthorized { status: u16, message: String },

    /// Non-2xx response with a best-effort error message
    #[error("Server error: {message} ({status})")]
    Server { status: u16, message: String },

    /// Client-side validation failure, caught before any call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Chat thread could not be obtained or created
    #[error("Chat thread provisioning failed: {0}")]
    ThreadProvisioning(String),

    /// Secure token store error
    #[error("Secure storage error: {0}")]
    SecureStorage(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization error
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status attached to this failure, when one exists.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
