//! Client configuration for the MoodTrack backend.

use crate::error::{ApiError, ApiResult};
use crate::util::{is_http_url, normalize_text_option};

/// Environment variable used to discover the backend base URL.
pub const API_BASE_ENV: &str = "MOODTRACK_API_BASE";

/// Runtime configuration for the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl AsRef<str>) -> ApiResult<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(base_url.as_ref())?,
        })
    }

    /// Resolve the base URL from `MOODTRACK_API_BASE`.
    pub fn from_env() -> ApiResult<Self> {
        let Some(base_url) = normalize_text_option(std::env::var(API_BASE_ENV).ok()) else {
            return Err(ApiError::InvalidConfiguration(format!(
                "{API_BASE_ENV} is not set"
            )));
        };
        Self::new(base_url)
    }
}

/// Normalize an API base URL, trimming whitespace and trailing slashes.
pub fn normalize_base_url(url: &str) -> ApiResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(ApiError::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
