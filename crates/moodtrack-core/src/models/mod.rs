//! Wire models for the MoodTrack backend API.

mod chat;
mod entry;
mod profile;
mod token;

pub use chat::{ChatReply, PromptOfDay};
pub use entry::{EntriesResponse, Entry, EntryPage, NewEntry};
pub use profile::{SettingsUpdate, UserProfile, UserSettings};
pub use token::TokenPair;
