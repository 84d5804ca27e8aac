//! Conversation snapshot storage (SQLite).

use crate::conversation::{Conversation, ConversationSummary};
use crate::error::{Error, Result};

use anyhow::Context as _;
use sqlx::{Row, SqlitePool};

/// Durable keyed store of conversation snapshots. The only component with
/// write access; everything else reads through it.
#[derive(Clone)]
pub struct ConversationStore {
    pool: SqlitePool,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("pool", &"<SqlitePool>")
            .finish()
    }
}

/// One row of a scan: either a readable summary or a record skipped with the
/// reason it could not be decoded. Enumeration is best-effort and never aborts
/// on a single bad row.
#[derive(Debug, Clone)]
pub enum ScanItem {
    Summary(ConversationSummary),
    Skipped { id: String, reason: String },
}

impl ConversationStore {
    /// Create a new store with the given SQLite pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the SQLite pool.
    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Upsert a conversation snapshot by id (last-write-wins).
    ///
    /// A single statement, so readers either see the previous snapshot or the
    /// new one, never a partial record. `created_at` is only written on first
    /// insert; subsequent saves keep the original.
    pub async fn put(&self, conversation: &Conversation) -> Result<()> {
        let data = serde_json::to_string(conversation)
            .with_context(|| format!("failed to serialize conversation {}", conversation.id))?;

        sqlx::query(
            r#"
            INSERT INTO conversations (id, directory, created_at, updated_at, message_count, preview, data)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                directory = excluded.directory,
                updated_at = excluded.updated_at,
                message_count = excluded.message_count,
                preview = excluded.preview,
                data = excluded.data
            "#,
        )
        .bind(&conversation.id)
        .bind(&conversation.directory)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .bind(conversation.messages.len() as i64)
        .bind(conversation.preview())
        .bind(&data)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save conversation {}", conversation.id))?;

        tracing::debug!(id = %conversation.id, messages = conversation.messages.len(), "conversation saved");
        Ok(())
    }

    /// Look up a conversation summary by exact id.
    pub async fn get(&self, id: &str) -> Result<ConversationSummary> {
        let row = sqlx::query(
            r#"
            SELECT id, directory, created_at, updated_at, message_count, preview
            FROM conversations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to look up conversation {id}"))?;

        match row {
            Some(row) => row_to_summary(&row).map_err(|e| Error::Corrupted {
                id: id.to_string(),
                reason: e.to_string(),
            }),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    /// Enumerate summaries of all stored conversations, newest first, without
    /// loading message bodies. Undecodable rows come back as
    /// [`ScanItem::Skipped`] and are logged, not propagated.
    pub async fn scan(&self) -> Result<Vec<ScanItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, directory, created_at, updated_at, message_count, preview
            FROM conversations
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .with_context(|| "failed to scan conversations")?;

        let items = rows
            .iter()
            .map(|row| match row_to_summary(row) {
                Ok(summary) => ScanItem::Summary(summary),
                Err(e) => {
                    let id: String = row.try_get("id").unwrap_or_default();
                    let reason = e.to_string();
                    tracing::warn!(%id, %reason, "skipping unreadable conversation record");
                    ScanItem::Skipped { id, reason }
                }
            })
            .collect();

        Ok(items)
    }

    /// Load the complete conversation body for display, export, or restore.
    pub async fn load_full(&self, id: &str) -> Result<Conversation> {
        let row = sqlx::query("SELECT data FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load conversation {id}"))?;

        let Some(row) = row else {
            return Err(Error::NotFound(id.to_string()));
        };

        let data: String = row.try_get("data").map_err(|e| Error::Corrupted {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&data).map_err(|e| Error::Corrupted {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// All stored ids, for prefix resolution.
    pub async fn ids(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM conversations ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .with_context(|| "failed to list conversation ids")?;

        Ok(rows
            .iter()
            .filter_map(|row| row.try_get("id").ok())
            .collect())
    }
}

/// Helper: Convert a database row to a ConversationSummary.
fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> Result<ConversationSummary, sqlx::Error> {
    Ok(ConversationSummary {
        id: row.try_get("id")?,
        directory: row.try_get("directory")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        preview: row.try_get("preview")?,
        message_count: row.try_get::<i64, _>("message_count")? as usize,
    })
}
