//! Console output formatter for chats and stream results

use colored::Colorize;
use chatline_domain::{Role, SessionIdentity, StreamStatus, Transcript};

/// Formats chat state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One-line terminal status: `Completed`, `Cancelled` or `Error: ...`
    pub fn status_line(status: &StreamStatus) -> String {
        let text = status.to_string();
        match status {
            StreamStatus::Completed => text.green().to_string(),
            StreamStatus::Cancelled => text.yellow().to_string(),
            StreamStatus::Failed(_) => text.red().bold().to_string(),
            StreamStatus::Idle | StreamStatus::Streaming => text.dimmed().to_string(),
        }
    }

    /// Saved chats, one per line, in the order given
    pub fn chat_list(chats: &[SessionIdentity]) -> String {
        if chats.is_empty() {
            return format!("{}\n", "No saved chats.".dimmed());
        }

        let width = chats.iter().map(|c| c.id.len()).max().unwrap_or(0);
        let mut output = String::new();
        for chat in chats {
            output.push_str(&format!(
                "  {}  {}\n",
                format!("{:<width$}", chat.id).cyan(),
                chat.title
            ));
        }
        output
    }

    /// Whole conversation, with an open turn marked as in progress
    pub fn transcript(transcript: &Transcript) -> String {
        if transcript.is_empty() {
            return format!("{}\n", "(empty conversation)".dimmed());
        }

        // An open turn is always the last message
        let open = transcript.has_open_turn().then(|| transcript.len() - 1);
        let mut output = String::new();
        for (i, message) in transcript.messages().iter().enumerate() {
            let label = match message.role {
                Role::User => "you".cyan().bold(),
                Role::Assistant => "assistant".green().bold(),
            };
            let streaming = if open == Some(i) {
                format!(" {}", "(streaming)".dimmed())
            } else {
                String::new()
            };
            output.push_str(&format!("{}{}\n", label, streaming));
            output.push_str(&Self::indent(&message.content, "  "));
            output.push_str("\n\n");
        }
        output
    }

    /// Header line for the active chat
    pub fn chat_header(id: Option<&str>, title: &str) -> String {
        match id {
            Some(id) => format!("{} {}", title.bold(), format!("[{}]", id).dimmed()),
            None => format!("{} {}", title.bold(), "[unsaved]".dimmed()),
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
