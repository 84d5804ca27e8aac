//! Identifier resolution: exact match first, then unique prefix.

use crate::error::{Error, Result};
use crate::history::store::ConversationStore;

/// Candidate ids included in an ambiguity error before the list is cut off.
const MAX_CANDIDATES: usize = 5;

/// Resolve a full or partial identifier to exactly one stored conversation.
///
/// Matching is case-sensitive against the canonical id string. An exact match
/// wins even when it is also a prefix of other ids.
pub async fn resolve_id(store: &ConversationStore, token: &str) -> Result<String> {
    if token.is_empty() {
        return Err(Error::InvalidArgument(
            "conversation id must not be empty".into(),
        ));
    }

    let ids = store.ids().await?;

    if ids.iter().any(|id| id == token) {
        return Ok(token.to_string());
    }

    let mut matches: Vec<String> = ids
        .into_iter()
        .filter(|id| id.starts_with(token))
        .collect();

    match matches.len() {
        0 => Err(Error::NotFound(token.to_string())),
        1 => Ok(matches.remove(0)),
        count => {
            matches.truncate(MAX_CANDIDATES);
            Err(Error::AmbiguousId {
                token: token.to_string(),
                count,
                candidates: matches,
            })
        }
    }
}
