//! Restoring a stored conversation into a directory's resume slot.

use crate::error::Result;
use crate::history::export::write_atomic;
use crate::history::resolve::resolve_id;
use crate::history::store::ConversationStore;

use anyhow::Context as _;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// File the chat loop reads on `--resume`.
pub const RESUME_FILE_NAME: &str = ".chat-history-resume.json";

/// What a restore did.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    /// Resolved conversation id.
    pub id: String,
    /// Resume slot that now holds the conversation.
    pub slot: PathBuf,
    /// Where the previous resume state was moved, when one existed.
    pub backup: Option<PathBuf>,
}

/// Materialize a stored conversation into `target_dir`'s resume slot.
///
/// Existing resume state is renamed aside with a timestamp suffix first, so a
/// restore never silently discards unsaved state. The store itself is never
/// mutated.
pub async fn restore_conversation(
    store: &ConversationStore,
    token: &str,
    target_dir: &Path,
) -> Result<RestoreOutcome> {
    let id = resolve_id(store, token).await?;
    let conversation = store.load_full(&id).await?;

    std::fs::create_dir_all(target_dir).with_context(|| {
        format!("failed to create target directory: {}", target_dir.display())
    })?;

    let slot = target_dir.join(RESUME_FILE_NAME);
    let backup = if slot.exists() {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let backup_path = target_dir.join(format!("{RESUME_FILE_NAME}.bak-{stamp}"));
        std::fs::rename(&slot, &backup_path).with_context(|| {
            format!("failed to back up existing resume state to {}", backup_path.display())
        })?;
        tracing::info!(backup = %backup_path.display(), "backed up existing resume state");
        Some(backup_path)
    } else {
        None
    };

    // Same JSON shape as a JSON export, so the chat loop's loader reads the
    // slot directly.
    let json = serde_json::to_string_pretty(&conversation)
        .with_context(|| format!("failed to serialize conversation {id}"))?;
    write_atomic(&slot, &json)?;

    tracing::debug!(%id, slot = %slot.display(), "conversation restored");
    Ok(RestoreOutcome { id, slot, backup })
}
