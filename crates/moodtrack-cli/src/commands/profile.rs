use moodtrack_core::models::SettingsUpdate;

use crate::commands::Client;
use crate::error::CliError;

pub async fn run_show(client: &Client, as_json: bool) -> Result<(), CliError> {
    let profile = match client.api().profile().await {
        Ok(profile) => profile,
        // Read path: fall back to the cached snapshot when one exists.
        Err(error) => {
            let Some(cached) = client.cache().cached_profile() else {
                return Err(error.into());
            };
            tracing::warn!("profile fetch failed, showing cached snapshot: {error}");
            cached
        }
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("username: {}", profile.username);
    if let Some(display_name) = profile.display_name.as_deref() {
        println!("display name: {display_name}");
    }
    if let Some(email) = profile.email.as_deref() {
        println!("email: {email}");
    }
    print_settings_lines(
        profile.settings.reminder_hour,
        profile.settings.tz.as_deref(),
        profile.settings.notifications_enabled,
    );
    Ok(())
}

pub async fn run_settings(
    client: &Client,
    reminder_hour: Option<u8>,
    tz: Option<String>,
    notifications: Option<bool>,
) -> Result<(), CliError> {
    let update = SettingsUpdate {
        reminder_hour,
        tz,
        notifications_enabled: notifications,
    };
    let updated = client.api().update_settings(&update).await?;

    println!("Settings updated");
    print_settings_lines(
        updated.settings.reminder_hour,
        updated.settings.tz.as_deref(),
        updated.settings.notifications_enabled,
    );
    Ok(())
}

fn print_settings_lines(reminder_hour: Option<u8>, tz: Option<&str>, notifications: bool) {
    match reminder_hour {
        Some(hour) => println!("reminder: {hour:02}:00"),
        None => println!("reminder: off"),
    }
    println!("timezone: {}", tz.unwrap_or("(unset)"));
    println!(
        "notifications: {}",
        if notifications { "on" } else { "off" }
    );
}
