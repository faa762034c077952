//! User profile and settings models

use serde::{Deserialize, Serialize};

/// The authenticated user's profile as served by `/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub settings: UserSettings,
}

impl UserProfile {
    /// Name to show in the UI: display name when set, username otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Per-user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Local hour (0-23) for the daily reminder, `None` = disabled
    #[serde(default)]
    pub reminder_hour: Option<u8>,
    /// IANA timezone name
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            reminder_hour: None,
            tz: None,
            notifications_enabled: true,
        }
    }
}

const fn default_notifications_enabled() -> bool {
    true
}

/// Partial settings update for `PATCH /me/settings`.
///
/// Unset fields are omitted from the payload so the server keeps their
/// current values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
}

impl SettingsUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reminder_hour.is_none() && self.tz.is_none() && self.notifications_enabled.is_none()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn profile_defaults_missing_settings() {
        let raw = r#"{"username": "mara"}"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.username, "mara");
        assert!(profile.settings.notifications_enabled);
        assert_eq!(profile.settings.reminder_hour, None);
    }

    #[test]
    fn label_prefers_display_name() {
        let raw = r#"{"username": "mara", "display_name": "Mara R."}"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.label(), "Mara R.");
    }

    #[test]
    fn partial_update_omits_unset_fields() {
        let update = SettingsUpdate {
            reminder_hour: Some(21),
            ..Default::default()
        };
        let serialized = serde_json::to_string(&update).unwrap();
        assert_eq!(serialized, r#"{"reminder_hour":21}"#);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(SettingsUpdate::default().is_empty());
        assert!(!SettingsUpdate {
            tz: Some("Europe/Rome".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
