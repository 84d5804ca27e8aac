//! Conversation export: JSON for lossless round-trips, Markdown and plain
//! text for human reading.

use crate::conversation::{Conversation, MessageRole};
use crate::error::{Error, Result};
use crate::history::resolve::resolve_id;
use crate::history::store::ConversationStore;

use anyhow::Context as _;
use std::io::Write as _;
use std::path::Path;

/// Export output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Lossless JSON, identical to the chat loop's own save format.
    Json,
    /// Markdown for readable documentation.
    Markdown,
    /// Plain text for simple reading.
    Text,
}

/// Export a conversation to `destination`, resolving `token` first.
///
/// Fails with `AlreadyExists` when the destination is present and `force` is
/// false. The file is written to a temporary sibling and renamed into place,
/// so an interrupted export never leaves a truncated destination behind.
/// Returns the resolved conversation id.
pub async fn export_conversation(
    store: &ConversationStore,
    token: &str,
    format: ExportFormat,
    destination: &Path,
    force: bool,
) -> Result<String> {
    let id = resolve_id(store, token).await?;
    let conversation = store.load_full(&id).await?;

    if destination.exists() && !force {
        return Err(Error::AlreadyExists(destination.to_path_buf()));
    }

    let contents = render(&conversation, format)?;
    write_atomic(destination, &contents)?;

    tracing::debug!(%id, destination = %destination.display(), ?format, "conversation exported");
    Ok(id)
}

/// Render a conversation in the given format.
pub fn render(conversation: &Conversation, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(conversation)
                .with_context(|| format!("failed to serialize conversation {}", conversation.id))?;
            Ok(json)
        }
        ExportFormat::Markdown => Ok(render_markdown(conversation)),
        ExportFormat::Text => Ok(render_text(conversation)),
    }
}

fn render_markdown(conversation: &Conversation) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Conversation {}\n\n", conversation.id));
    out.push_str(&format!("- Directory: {}\n", conversation.directory));
    out.push_str(&format!("- Messages: {}\n", conversation.messages.len()));
    out.push_str(&format!(
        "- Created: {}\n",
        conversation.created_at.to_rfc3339()
    ));
    out.push_str(&format!(
        "- Updated: {}\n",
        conversation.updated_at.to_rfc3339()
    ));

    for message in &conversation.messages {
        out.push_str(&format!(
            "\n## {} ({})\n\n",
            role_heading(message.role),
            message.timestamp.to_rfc3339()
        ));
        // Tool output is program output; fence it so Markdown renders it
        // verbatim.
        if message.role == MessageRole::Tool {
            out.push_str("```\n");
            out.push_str(&message.content);
            if !message.content.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        } else {
            out.push_str(&message.content);
            out.push('\n');
        }
    }

    out
}

fn render_text(conversation: &Conversation) -> String {
    const DELIMITER: &str = "----------------------------------------";

    let mut out = String::new();
    out.push_str(&format!("Conversation: {}\n", conversation.id));
    out.push_str(&format!("Directory:    {}\n", conversation.directory));
    out.push_str(&format!("Messages:     {}\n", conversation.messages.len()));

    for message in &conversation.messages {
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&format!(
            "[{}] {}\n",
            message.role,
            message.timestamp.to_rfc3339()
        ));
        out.push_str(&message.content);
        if !message.content.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

fn role_heading(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "User",
        MessageRole::Assistant => "Assistant",
        MessageRole::Tool => "Tool",
    }
}

/// Write `contents` to `destination` atomically: stage in a temporary file in
/// the same directory, then rename into place.
pub(crate) fn write_atomic(destination: &Path, contents: &str) -> Result<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    staged.persist(destination).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
