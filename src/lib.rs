//! Local persistent history of AI chat conversations: every session is stored
//! as a snapshot keyed by id, and can be listed, searched, shown, exported in
//! several formats, or restored into a working directory for later resumption.

pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod history;

pub use conversation::{Conversation, ConversationSummary, Message, MessageRole};
pub use error::{Error, Result};
