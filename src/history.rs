//! Conversation history engine: persistence, lookup, query, export, restore.

pub mod export;
pub mod query;
pub mod resolve;
pub mod restore;
pub mod snippet;
pub mod store;

pub use export::{export_conversation, render, ExportFormat};
pub use query::{list_conversations, search_conversations, SearchResult};
pub use resolve::resolve_id;
pub use restore::{restore_conversation, RestoreOutcome, RESUME_FILE_NAME};
pub use snippet::Snippet;
pub use store::{ConversationStore, ScanItem};
