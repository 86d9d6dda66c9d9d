//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for chatline
#[derive(Parser, Debug)]
#[command(name = "chatline")]
#[command(author, version, about = "Streaming chat client with saved conversations")]
#[command(long_about = r#"
chatline sends your prompt to a text-generation backend and prints the reply
as it streams in. Conversations can be saved, listed, resumed and deleted.

Press Ctrl-C while a reply is streaming to cancel it; the partial reply is
kept in the conversation.

Configuration files are loaded from (in priority order):
1. CHATLINE_<SECTION>__<KEY> environment variables
2. --config <path>     Explicit config file
3. ./chatline.toml     Project-level config
4. ~/.config/chatline/config.toml   Global config

Example:
  chatline "Explain Rust lifetimes in one paragraph"
  chatline --save "Draft a release announcement"
  chatline --chat
  chatline --chat --load chat_20261016_101500_abcdef12
"#)]
pub struct Cli {
    /// Prompt to send (one-shot mode; not required in chat mode)
    pub prompt: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Load a saved chat (continues it with PROMPT or in chat mode)
    #[arg(short, long, value_name = "ID")]
    pub load: Option<String>,

    /// List saved chats and exit
    #[arg(long)]
    pub list: bool,

    /// Delete a saved chat and exit
    #[arg(long, value_name = "ID")]
    pub delete: Option<String>,

    /// Save the conversation after a one-shot prompt
    #[arg(short, long)]
    pub save: bool,

    /// Backend base URL (overrides configuration)
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print the reply (no status line)
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
