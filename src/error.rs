//! Error taxonomy shared across the crate.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by history operations.
///
/// `Corrupted` is recovered locally during enumeration (the record is skipped
/// with a warning); every other variant propagates to the caller as a single
/// actionable message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no conversation matches '{0}'")]
    NotFound(String),

    #[error("'{token}' matches {count} conversations, use a longer prefix (candidates: {candidates:?})")]
    AmbiguousId {
        token: String,
        count: usize,
        candidates: Vec<String>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{} already exists (pass --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("conversation {id} is unreadable: {reason}")]
    Corrupted { id: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
