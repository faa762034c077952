//! Chat coach models

use serde::Deserialize;

/// Reply from `POST /chatbot/send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub thread_id: String,
    pub reply: String,
}

/// Daily journaling prompt from `GET /chatbot/prompt_of_day`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptOfDay {
    pub text: String,
}
