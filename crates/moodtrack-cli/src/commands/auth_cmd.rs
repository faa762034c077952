use moodtrack_core::{TokenKind, TokenStore};

use crate::commands::Client;
use crate::error::CliError;

pub async fn run_login(client: &Client, username: &str, password: &str) -> Result<(), CliError> {
    client.session().login(username, password).await?;

    let session = client.session().session();
    let label = session.username.as_deref().unwrap_or(username);
    println!("Signed in as {label}");
    if session.thread_id.is_none() {
        println!("Note: chat thread could not be provisioned; chat is disabled until it succeeds.");
    }
    Ok(())
}

pub async fn run_logout(client: &Client) -> Result<(), CliError> {
    client.session().logout().await;
    println!("Signed out");
    Ok(())
}

pub async fn run_status(client: &Client) -> Result<(), CliError> {
    let stored = client.api().store().get(TokenKind::Access)?;
    if stored.is_none() {
        println!("Not signed in.");
        return Ok(());
    }

    match client.api().profile().await {
        Ok(profile) => {
            let email_label = profile.email.as_deref().unwrap_or("(no email)");
            println!("Signed in as {} ({email_label})", profile.label());
        }
        Err(error) => {
            println!("A stored session exists but the profile could not be fetched: {error}");
        }
    }
    Ok(())
}
