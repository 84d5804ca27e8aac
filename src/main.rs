//! chat-history CLI entry point.

use chat_history::config::{HistoryConfig, DEFAULT_LIMIT};
use chat_history::db::Db;
use chat_history::history::{
    export_conversation, list_conversations, render, resolve_id, restore_conversation,
    search_conversations, ConversationStore, ExportFormat,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chat-history")]
#[command(about = "Browse, search, export, and restore saved chat conversations")]
struct Cli {
    /// Store directory (defaults to ~/.chat-history or CHAT_HISTORY_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List recent conversations
    List {
        /// Maximum number of conversations to show
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Filter by directory path
        #[arg(short, long)]
        path: Option<String>,

        /// Filter conversations containing this text
        #[arg(short, long)]
        contains: Option<String>,
    },
    /// Search conversations by content
    Search {
        /// Search query to find in conversation content
        query: String,

        /// Maximum number of results to show
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Show a specific conversation
    Show {
        /// Conversation ID or partial ID
        id: String,
    },
    /// Export a conversation to a file
    Export {
        /// Conversation ID or partial ID
        id: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Restore a conversation into a directory's resume slot
    Restore {
        /// Conversation ID or partial ID
        id: String,

        /// Directory to restore into
        #[arg(long, default_value = ".")]
        target_directory: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> chat_history::Result<()> {
    let data_dir = cli
        .data_dir
        .map(|dir| HistoryConfig::at(dir).data_dir)
        .unwrap_or_else(|| HistoryConfig::load().data_dir);

    let db = Db::connect(&data_dir).await?;
    let store = ConversationStore::new(db.sqlite.clone());

    match cli.command {
        Command::List {
            limit,
            path,
            contains,
        } => {
            let summaries =
                list_conversations(&store, limit, path.as_deref(), contains.as_deref()).await?;
            if summaries.is_empty() {
                println!("No conversations found.");
            }
            for summary in summaries {
                println!(
                    "{}  {}  {}  ({} messages)",
                    short_id(&summary.id),
                    summary.updated_at.format("%Y-%m-%d %H:%M"),
                    summary.directory,
                    summary.message_count,
                );
                if !summary.preview.is_empty() {
                    println!("    {}", summary.preview);
                }
            }
        }
        Command::Search { query, limit } => {
            let results = search_conversations(&store, &query, limit).await?;
            if results.is_empty() {
                println!("No matches for '{query}'.");
            }
            for result in results {
                println!(
                    "{}  {}  {}",
                    short_id(&result.summary.id),
                    result.summary.updated_at.format("%Y-%m-%d %H:%M"),
                    result.summary.directory,
                );
                println!("    [{}] {}", result.matched_role, result.snippet);
            }
        }
        Command::Show { id } => {
            let resolved = resolve_id(&store, &id).await?;
            let conversation = store.load_full(&resolved).await?;
            print!("{}", render(&conversation, ExportFormat::Text)?);
        }
        Command::Export {
            id,
            output,
            format,
            force,
        } => {
            let resolved = export_conversation(&store, &id, format, &output, force).await?;
            println!("Exported {} to {}", short_id(&resolved), output.display());
        }
        Command::Restore {
            id,
            target_directory,
        } => {
            let outcome = restore_conversation(&store, &id, &target_directory).await?;
            if let Some(backup) = &outcome.backup {
                println!("Previous resume state backed up to {}", backup.display());
            }
            println!(
                "Restored {} to {}",
                short_id(&outcome.id),
                outcome.slot.display()
            );
        }
    }

    db.close().await;
    Ok(())
}

/// First 8 characters of an id for display.
fn short_id(id: &str) -> &str {
    let end = id
        .char_indices()
        .nth(8)
        .map(|(b, _)| b)
        .unwrap_or(id.len());
    &id[..end]
}
