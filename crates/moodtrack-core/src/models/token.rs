//! Token pair returned by login and refresh.

use std::fmt;

use serde::Deserialize;

/// Access/refresh token pair from `/auth/login` and `/auth/refresh`.
///
/// The refresh token is optional: the backend may rotate it or omit it
/// entirely for short-lived sessions.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_debug_redacts_tokens() {
        let pair = TokenPair {
            access_token: "secret-access-token".to_string(),
            refresh_token: Some("secret-refresh-token".to_string()),
        };
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn refresh_token_is_optional_on_the_wire() {
        let pair: TokenPair = serde_json::from_str(r#"{"access_token": "a"}"#).unwrap();
        assert_eq!(pair.refresh_token, None);
    }
}
