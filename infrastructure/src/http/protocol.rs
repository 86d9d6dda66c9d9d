//! Wire types for the backend's chat storage endpoints.
//!
//! The `/stream` request body is
//! [`StreamRequest`](chatline_application::StreamRequest) itself; its reply is
//! raw text and has no wire type.

use chatline_domain::Message;
use serde::{Deserialize, Serialize};

/// One entry of `GET /list_chats`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatSummary {
    /// Chat id as stored by the backend
    pub filename: String,
    #[serde(default)]
    pub title: String,
}

/// Body of `GET /load_chat/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoadChatResponse {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub title: String,
}

/// Body of `POST /save_chat`
#[derive(Debug, Clone, Serialize)]
pub struct SaveChatRequest<'a> {
    pub title: &'a str,
    pub messages: &'a [Message],
    pub filename: &'a str,
}

/// Acknowledgement returned by the mutating endpoints
///
/// The backend answers with free text such as `"chat_1 saved."`, so only a
/// leading error word marks a failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
}

impl StatusResponse {
    pub fn is_failure(&self) -> bool {
        let Some(first) = self.status.split_whitespace().next() else {
            return false;
        };
        let word = first
            .trim_end_matches([':', '.', ',', '!'])
            .to_ascii_lowercase();
        matches!(word.as_str(), "error" | "fail" | "failed" | "failure")
    }
}
