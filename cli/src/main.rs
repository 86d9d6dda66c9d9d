//! CLI entrypoint for chatline
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chatline_application::{
    ChatLibrary, ConversationLogger, LoadedChat, NoConversationLogger, SharedTranscript,
};
use chatline_domain::StreamStatus;
use chatline_infrastructure::{
    BackendClient, ConfigLoader, FileConfig, HttpChatPersistence, HttpStreamGateway,
    JsonlConversationLogger,
};
use chatline_presentation::{
    ChatRepl, Cli, ConsoleFormatter, ReplConfig, StreamPrinter, TurnRunner,
};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting chatline");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("Effective configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    for issue in config.validate() {
        warn!("Configuration issue: {}", issue);
        eprintln!("Warning: {}", issue);
    }

    // === Dependency Injection ===
    let backend = BackendClient::new(&config.backend).context("Invalid backend configuration")?;
    let logger = conversation_logger(&config);
    let library = ChatLibrary::new(Arc::new(HttpChatPersistence::new(backend.clone())))
        .with_conversation_logger(logger.clone());
    let runner =
        TurnRunner::new(Arc::new(HttpStreamGateway::new(backend))).with_conversation_logger(logger);

    if cli.list {
        let chats = library.list().await.context("Failed to list chats")?;
        print!("{}", ConsoleFormatter::chat_list(&chats));
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(id) = &cli.delete {
        return match library.delete(id).await {
            Ok(()) => {
                println!("Deleted {}", id);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) if e.is_not_found() => {
                eprintln!("No saved chat with id {}", id);
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete chat {}", id)),
        };
    }

    let loaded = match &cli.load {
        Some(id) => Some(
            library
                .load(id)
                .await
                .with_context(|| format!("Failed to load chat {}", id))?,
        ),
        None => None,
    };

    // Chat mode
    if cli.chat {
        let repl_config = ReplConfig {
            auto_save: config.chat.auto_save,
            history_file: config.chat.history_file.clone(),
            quiet: cli.quiet,
        };
        let mut repl = ChatRepl::new(runner, library, repl_config);
        if let Some(loaded) = loaded {
            repl = repl.with_loaded(loaded);
        }
        repl.run().await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Single prompt mode - prompt is required unless only showing a loaded chat
    let prompt = match (cli.prompt, &loaded) {
        (Some(prompt), _) => prompt,
        (None, Some(loaded)) => {
            println!(
                "{}",
                ConsoleFormatter::chat_header(Some(&loaded.identity.id), &loaded.identity.title)
            );
            print!("{}", ConsoleFormatter::transcript(&loaded.transcript));
            return Ok(ExitCode::SUCCESS);
        }
        (None, None) => bail!("Prompt is required. Use --chat for interactive mode."),
    };

    let (identity, transcript) = match loaded {
        Some(LoadedChat {
            identity,
            transcript,
        }) => (Some(identity), SharedTranscript::new(transcript)),
        None => (None, SharedTranscript::default()),
    };

    let printer = StreamPrinter::stdout();
    let outcome = runner.run(&transcript, &prompt, &printer).await?;

    // Status goes to stderr so stdout carries only the reply
    if !cli.quiet {
        eprintln!("{}", ConsoleFormatter::status_line(&outcome.status));
    }

    let finished = matches!(
        outcome.status,
        StreamStatus::Completed | StreamStatus::Cancelled
    );
    if finished && (cli.save || config.chat.auto_save) {
        let snapshot = transcript.snapshot().await;
        let saved = library
            .save(
                &snapshot,
                identity.as_ref().map(|i| i.id.as_str()),
                identity.as_ref().map(|i| i.title.as_str()),
            )
            .await
            .context("Failed to save chat")?;
        if !cli.quiet {
            eprintln!("Saved as {}", saved.id);
        }
    }

    Ok(match outcome.status {
        StreamStatus::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

/// JSONL conversation log if configured, otherwise a no-op logger.
fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    let Some(path) = config.logging.conversation_log_path() else {
        return Arc::new(NoConversationLogger);
    };
    match JsonlConversationLogger::new(&path) {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}
