use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "moodtrack")]
#[command(about = "Mood journaling from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the backend API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session in the keychain
    Login {
        /// Account username
        #[arg(long, value_name = "NAME")]
        username: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show whether a session is stored and who it belongs to
    Status,
    /// Work with journal entries
    Entries {
        #[command(subcommand)]
        command: EntriesCommands,
    },
    /// Send a message to the journaling companion
    Chat {
        /// Message text
        message: Vec<String>,
    },
    /// Show today's writing prompt
    Prompt,
    /// Show or update the user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Inspect or update CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum EntriesCommands {
    /// List recent entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: u64,
        /// Zero-based page to fetch
        #[arg(short, long, default_value = "0")]
        page: u64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new entry
    #[command(alias = "new")]
    Add {
        /// Optional entry title
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
        /// Entry content
        content: Vec<String>,
        /// Wait for the mood score to resolve before exiting
        #[arg(long)]
        wait: bool,
    },
    /// Show a single entry
    Show {
        /// Entry id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the profile and current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update one or more settings fields
    Settings {
        /// Local hour (0-23) for the daily reminder
        #[arg(long, value_name = "HOUR")]
        reminder_hour: Option<u8>,
        /// IANA timezone name
        #[arg(long, value_name = "TZ")]
        tz: Option<String>,
        /// Enable or disable notifications
        #[arg(long, value_name = "BOOL")]
        notifications: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the config file path and current values
    Show,
    /// Persist the backend API base URL
    SetApiBase {
        /// API base URL, e.g. https://api.moodtrack.app
        url: String,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
