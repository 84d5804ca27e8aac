//! Store location and tuning knobs.

use std::path::PathBuf;

/// Characters of the last message kept as a listing preview.
pub const PREVIEW_CHARS: usize = 100;

/// Character budget for search snippets.
pub const SNIPPET_BUDGET: usize = 80;

/// Default result cap for `list` and `search`.
pub const DEFAULT_LIMIT: usize = 10;

/// History store configuration.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Directory holding the history database (~/.chat-history or CHAT_HISTORY_DIR).
    pub data_dir: PathBuf,
}

impl HistoryConfig {
    /// Resolve the data directory from env or default (~/.chat-history).
    pub fn default_data_dir() -> PathBuf {
        std::env::var("CHAT_HISTORY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|d| d.join(".chat-history"))
                    .unwrap_or_else(|| PathBuf::from("./.chat-history"))
            })
    }

    /// Load configuration from the environment.
    pub fn load() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
        }
    }

    /// Build a configuration rooted at an explicit directory.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}
