//! MoodTrack CLI - mood journaling from the terminal.

mod cli;
mod commands;
mod error;
mod settings;
mod token_store;

use clap::Parser;

use moodtrack_core::MoodTrackClient;

use crate::cli::{Cli, Commands, EntriesCommands, ProfileCommands};
use crate::commands::{
    auth_cmd, chat, completions, config_cmd, entries, profile, require_session, Client,
};
use crate::error::CliError;
use crate::token_store::KeyringTokenStore;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("moodtrack=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell, output } => {
            return completions::run_completions(shell, output.as_deref());
        }
        Commands::Config { command } => return config_cmd::run_config(command),
        _ => {}
    }

    let client = build_client(cli.api_base.as_deref())?;

    match cli.command {
        Commands::Login { username, password } => {
            auth_cmd::run_login(&client, &username, &password).await?;
        }
        Commands::Logout => auth_cmd::run_logout(&client).await?,
        Commands::Status => auth_cmd::run_status(&client).await?,
        Commands::Entries { command } => {
            require_session(&client)?;
            match command {
                EntriesCommands::List { limit, page, json } => {
                    entries::run_list(&client, limit, page, json).await?;
                }
                EntriesCommands::Add {
                    title,
                    content,
                    wait,
                } => {
                    entries::run_add(&client, title.as_deref(), &content, wait).await?;
                }
                EntriesCommands::Show { id } => entries::run_show(&client, id).await?,
            }
        }
        Commands::Chat { message } => {
            require_session(&client)?;
            chat::run_send(&client, &message).await?;
        }
        Commands::Prompt => {
            require_session(&client)?;
            chat::run_prompt(&client).await?;
        }
        Commands::Profile { command } => {
            require_session(&client)?;
            match command {
                ProfileCommands::Show { json } => profile::run_show(&client, json).await?,
                ProfileCommands::Settings {
                    reminder_hour,
                    tz,
                    notifications,
                } => {
                    profile::run_settings(&client, reminder_hour, tz, notifications).await?;
                }
            }
        }
        Commands::Completions { .. } | Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn build_client(api_base_flag: Option<&str>) -> Result<Client, CliError> {
    let config = settings::resolve_client_config(api_base_flag)?;
    Ok(MoodTrackClient::new(&config, KeyringTokenStore::new())?)
}
