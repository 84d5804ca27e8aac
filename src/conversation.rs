//! Conversation data model.
//!
//! A [`Conversation`] is the unit of persistence: one saved chat session with
//! an immutable id, ordered messages, and the opaque payloads the chat loop
//! needs to resume exactly where it left off.

use crate::config::PREVIEW_CHARS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Tool execution state carried for round-trip reconstruction.
///
/// Known kinds get typed fields; anything unrecognized passes through as raw
/// JSON so re-serializing a loaded conversation loses nothing. Known variants
/// keep a flattened `extra` map for the same reason: fields added by a newer
/// writer survive a load/save cycle here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolState {
    Known(KnownToolState),
    Opaque(Value),
}

/// Tool kinds this crate understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownToolState {
    Shell {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exit_code: Option<i64>,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
    FileEdit {
        path: String,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
}

/// A saved chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Assigned once when the session starts; immutable thereafter.
    pub id: String,
    /// Working directory the session occurred in. Metadata, not identity.
    pub directory: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every snapshot write.
    pub updated_at: DateTime<Utc>,
    /// Chronological; order is preserved through persistence, export, restore.
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub tool_state: Vec<ToolState>,
    #[serde(default)]
    pub context_items: Vec<Value>,
    #[serde(default)]
    pub agent_metadata: Value,
}

impl Conversation {
    /// Start a new conversation in the given working directory.
    pub fn new(directory: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            directory: directory.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            tool_state: Vec::new(),
            context_items: Vec::new(),
            agent_metadata: Value::Null,
        }
    }

    /// Append a message and refresh `updated_at`.
    pub fn push_message(&mut self, role: MessageRole, content: impl Into<String>) {
        let now = Utc::now();
        self.messages.push(Message {
            role,
            content: content.into(),
            timestamp: now,
        });
        self.updated_at = now;
    }

    /// Listing preview: the first [`PREVIEW_CHARS`] characters of the last
    /// message. Empty for a conversation with no messages.
    pub fn preview(&self) -> String {
        self.messages
            .last()
            .map(|m| truncate_chars(&m.content, PREVIEW_CHARS))
            .unwrap_or_default()
    }
}

/// One row of a store scan, cheap enough to list without loading bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub directory: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub preview: String,
    pub message_count: usize,
}

/// Truncate to at most `max_chars` characters, never splitting a character.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}
