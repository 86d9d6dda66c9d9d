//! Session identity, the id/title pair of a persisted conversation.

use super::transcript::Transcript;
use crate::core::string::{first_non_empty_line, truncate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum title length in bytes (including the `...` suffix)
pub const MAX_TITLE_LEN: usize = 48;

/// Title used when the transcript has nothing to derive one from
pub const DEFAULT_TITLE: &str = "New chat";

/// Identity of a saved conversation (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: String,
    pub title: String,
}

impl SessionIdentity {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Generate a client-side chat id: `chat_<YYYYMMDD>_<HHMMSS>_<8 hex>`.
pub fn generate_chat_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("chat_{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..8])
}

/// Derive a title from the first message of the transcript.
pub fn derive_title(transcript: &Transcript) -> String {
    transcript
        .first()
        .and_then(|m| first_non_empty_line(&m.content))
        .map(|line| truncate(line, MAX_TITLE_LEN))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::Message;
    use chrono::TimeZone;

    #[test]
    fn test_generated_id_has_timestamp_and_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap();
        let id = generate_chat_id(now);
        assert!(id.starts_with("chat_20261016_090507_"), "{id}");
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ids_differ_within_same_second() {
        let now = Utc::now();
        assert_ne!(generate_chat_id(now), generate_chat_id(now));
    }

    #[test]
    fn test_title_from_first_line_of_first_message() {
        let t = Transcript::from_messages(vec![
            Message::user("\n  Explain lifetimes  \nwith examples"),
            Message::assistant("Sure"),
        ]);
        assert_eq!(derive_title(&t), "Explain lifetimes");
    }

    #[test]
    fn test_long_title_is_truncated() {
        let long = "a".repeat(100);
        let t = Transcript::from_messages(vec![Message::user(long)]);
        let title = derive_title(&t);
        assert_eq!(title.len(), MAX_TITLE_LEN);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_empty_transcript_gets_default_title() {
        assert_eq!(derive_title(&Transcript::new()), DEFAULT_TITLE);
    }
}
