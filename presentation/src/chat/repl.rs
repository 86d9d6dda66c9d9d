//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::chat::turn::TurnRunner;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::output::printer::StreamPrinter;
use chatline_application::{ChatLibrary, LoadedChat, PersistenceError, SharedTranscript};
use chatline_domain::{SessionIdentity, StreamStatus, Transcript, derive_title};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tracing::debug;

/// A parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    New,
    Save,
    /// Set the title, or show it when no text is given
    Title(Option<String>),
    List,
    Load(String),
    Delete(String),
    History,
    Quit,
    /// A known command missing its argument
    Usage(&'static str),
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        match name {
            "/quit" | "/exit" | "/q" => Self::Quit,
            "/help" | "/h" | "/?" => Self::Help,
            "/new" => Self::New,
            "/save" => Self::Save,
            "/title" => Self::Title((!arg.is_empty()).then(|| arg.to_string())),
            "/list" | "/ls" => Self::List,
            "/load" if arg.is_empty() => Self::Usage("/load <id>"),
            "/load" => Self::Load(arg.to_string()),
            "/delete" if arg.is_empty() => Self::Usage("/delete <id>"),
            "/delete" => Self::Delete(arg.to_string()),
            "/history" => Self::History,
            _ => Self::Unknown(name.to_string()),
        }
    }
}

/// Id and title of the conversation on screen
#[derive(Debug, Default)]
struct ActiveChat {
    /// Set once the chat has been saved or loaded
    id: Option<String>,
    /// Set by `/title`, a load or a save
    title: Option<String>,
}

/// Interactive chat REPL
pub struct ChatRepl {
    runner: TurnRunner,
    library: ChatLibrary,
    transcript: SharedTranscript,
    active: ActiveChat,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl with an empty conversation
    pub fn new(runner: TurnRunner, library: ChatLibrary, config: ReplConfig) -> Self {
        Self {
            runner,
            library,
            transcript: SharedTranscript::default(),
            active: ActiveChat::default(),
            config,
        }
    }

    /// Resume a saved conversation
    pub fn with_loaded(mut self, loaded: LoadedChat) -> Self {
        self.transcript = SharedTranscript::new(loaded.transcript);
        self.active = ActiveChat {
            id: Some(loaded.identity.id),
            title: Some(loaded.identity.title),
        };
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome().await;

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(ReplCommand::parse(line)).await {
                            break;
                        }
                        continue;
                    }

                    self.process_prompt(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C at the prompt only clears the line
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn print_welcome(&self) {
        if self.config.quiet {
            return;
        }
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              chatline - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{}", self.header().await);
        println!("Ctrl-C cancels a streaming reply. Type /help for commands.");
        println!();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /new              - Start a new conversation");
        println!("  /save             - Save the conversation");
        println!("  /title [text]     - Show or set the title");
        println!("  /list             - List saved chats");
        println!("  /load <id>        - Load a saved chat");
        println!("  /delete <id>      - Delete a saved chat");
        println!("  /history          - Show the conversation");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    async fn header(&self) -> String {
        let title = match &self.active.title {
            Some(title) => title.clone(),
            None => derive_title(&self.transcript.snapshot().await),
        };
        ConsoleFormatter::chat_header(self.active.id.as_deref(), &title)
    }

    /// Handle a slash command. Returns true if the REPL should exit.
    pub async fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_help(),
            ReplCommand::New => {
                self.reset(Transcript::new(), ActiveChat::default()).await;
                println!("Started a new conversation.");
            }
            ReplCommand::Save => match self.save().await {
                Ok(identity) => println!("Saved as {}", identity.id.cyan()),
                Err(e) => eprintln!("{} {}", "Save failed:".red(), e),
            },
            ReplCommand::Title(None) => println!("{}", self.header().await),
            ReplCommand::Title(Some(title)) => {
                println!("Title set to \"{}\" (applies on next save)", title);
                self.active.title = Some(title);
            }
            ReplCommand::List => match self.library.list().await {
                Ok(chats) => print!("{}", ConsoleFormatter::chat_list(&chats)),
                Err(e) => eprintln!("{} {}", "List failed:".red(), e),
            },
            ReplCommand::Load(id) => match self.library.load(&id).await {
                Ok(loaded) => {
                    let active = ActiveChat {
                        id: Some(loaded.identity.id),
                        title: Some(loaded.identity.title),
                    };
                    self.reset(loaded.transcript, active).await;
                    println!("{}", self.header().await);
                    print!(
                        "{}",
                        ConsoleFormatter::transcript(&self.transcript.snapshot().await)
                    );
                }
                Err(e) if e.is_not_found() => println!("No saved chat with id {}", id),
                Err(e) => eprintln!("{} {}", "Load failed:".red(), e),
            },
            ReplCommand::Delete(id) => match self.library.delete(&id).await {
                Ok(()) => {
                    println!("Deleted {}", id);
                    if self.active.id.as_deref() == Some(id.as_str()) {
                        self.reset(Transcript::new(), ActiveChat::default()).await;
                        println!("The active conversation was cleared.");
                    }
                }
                Err(e) if e.is_not_found() => println!("No saved chat with id {}", id),
                Err(e) => eprintln!("{} {}", "Delete failed:".red(), e),
            },
            ReplCommand::History => {
                print!(
                    "{}",
                    ConsoleFormatter::transcript(&self.transcript.snapshot().await)
                );
            }
            ReplCommand::Usage(usage) => println!("Usage: {}", usage),
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_prompt(&mut self, prompt: &str) {
        println!();
        let printer = StreamPrinter::stdout();
        match self.runner.run(&self.transcript, prompt, &printer).await {
            Ok(outcome) => {
                if !self.config.quiet {
                    println!("{}", ConsoleFormatter::status_line(&outcome.status));
                }
                let finished = matches!(
                    outcome.status,
                    StreamStatus::Completed | StreamStatus::Cancelled
                );
                if self.config.auto_save && finished {
                    match self.save().await {
                        Ok(identity) => debug!("Auto-saved {}", identity.id),
                        Err(e) => eprintln!("{} {}", "Auto-save failed:".red(), e),
                    }
                }
            }
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
        println!();
    }

    /// Save the active conversation, keeping its id and title stable.
    async fn save(&mut self) -> Result<SessionIdentity, PersistenceError> {
        let snapshot = self.transcript.snapshot().await;
        let identity = self
            .library
            .save(
                &snapshot,
                self.active.id.as_deref(),
                self.active.title.as_deref(),
            )
            .await?;
        self.active.id = Some(identity.id.clone());
        self.active.title = Some(identity.title.clone());
        Ok(identity)
    }

    async fn reset(&mut self, transcript: Transcript, active: ActiveChat) {
        self.transcript.replace(transcript).await;
        self.active = active;
    }
}
