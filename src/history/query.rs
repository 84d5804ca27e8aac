//! Listing with filters and full-text search over the store.

use crate::conversation::{Conversation, ConversationSummary, Message, MessageRole};
use crate::error::{Error, Result};
use crate::history::snippet::{self, Snippet};
use crate::history::store::{ConversationStore, ScanItem};

/// One full-text search hit: the conversation plus a representative excerpt
/// from the first matching message.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub summary: ConversationSummary,
    pub snippet: Snippet,
    pub matched_role: MessageRole,
    /// Index of the matching message within the conversation.
    pub matched_message: usize,
}

/// List stored conversations, newest first.
///
/// `path_filter` keeps conversations whose directory contains the filter as a
/// case-sensitive substring; `contains_filter` keeps conversations where any
/// message contains the filter (also case-sensitive). Bodies are only loaded
/// when `contains_filter` demands it, and never more than `limit` of the
/// results are held loaded. `limit == 0` returns an empty list.
pub async fn list_conversations(
    store: &ConversationStore,
    limit: usize,
    path_filter: Option<&str>,
    contains_filter: Option<&str>,
) -> Result<Vec<ConversationSummary>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    for item in store.scan().await? {
        // Skipped rows are already warned about by the scan.
        let ScanItem::Summary(summary) = item else {
            continue;
        };

        if let Some(path) = path_filter {
            if !summary.directory.contains(path) {
                continue;
            }
        }

        if let Some(needle) = contains_filter {
            let conversation = match store.load_full(&summary.id).await {
                Ok(conversation) => conversation,
                Err(Error::Corrupted { id, reason }) => {
                    tracing::warn!(%id, %reason, "skipping unreadable conversation body");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !conversation
                .messages
                .iter()
                .any(|m| m.content.contains(needle))
            {
                continue;
            }
        }

        results.push(summary);
        if results.len() == limit {
            break;
        }
    }

    Ok(results)
}

/// Search full message content for `query` as a case-insensitive substring.
///
/// Results come back newest first, each carrying a snippet of the first
/// matching message. An empty query is rejected rather than matching nothing
/// or everything. Conversations with no messages are never searched.
pub async fn search_conversations(
    store: &ConversationStore,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    if query.is_empty() {
        return Err(Error::InvalidArgument(
            "search query must not be empty".into(),
        ));
    }
    if limit == 0 {
        return Ok(Vec::new());
    }

    let needle = query.to_lowercase();
    let mut results = Vec::new();

    for item in store.scan().await? {
        let ScanItem::Summary(summary) = item else {
            continue;
        };
        if summary.message_count == 0 {
            continue;
        }

        let conversation = match store.load_full(&summary.id).await {
            Ok(conversation) => conversation,
            Err(Error::Corrupted { id, reason }) => {
                tracing::warn!(%id, %reason, "skipping unreadable conversation body");
                continue;
            }
            Err(e) => return Err(e),
        };

        let Some((index, message, offset, len)) = first_match(&conversation, &needle) else {
            continue;
        };

        let snippet = snippet::extract(&message.content, offset, len);
        results.push(SearchResult {
            summary,
            snippet,
            matched_role: message.role,
            matched_message: index,
        });
        if results.len() == limit {
            break;
        }
    }

    Ok(results)
}

/// First message containing the lowercased needle, by message order, with the
/// byte span of the hit in the original (un-lowercased) content.
fn first_match<'a>(
    conversation: &'a Conversation,
    needle_lower: &str,
) -> Option<(usize, &'a Message, usize, usize)> {
    for (index, message) in conversation.messages.iter().enumerate() {
        if let Some((offset, len)) = find_case_insensitive(&message.content, needle_lower) {
            return Some((index, message, offset, len));
        }
    }
    None
}

/// Case-insensitive substring search reporting the match span in the original
/// string's byte offsets.
///
/// Lowercasing can change byte lengths ('İ' lowers to two characters), so an
/// offset found in `content.to_lowercase()` does not index into `content`.
/// The lowered haystack is built char by char here, recording for every
/// lowered byte the original offset it came from, and the hit is mapped back
/// through that table.
fn find_case_insensitive(content: &str, needle_lower: &str) -> Option<(usize, usize)> {
    let mut lowered = String::with_capacity(content.len());
    let mut origin = Vec::with_capacity(content.len() + 1);
    for (offset, c) in content.char_indices() {
        for lc in c.to_lowercase() {
            let before = lowered.len();
            lowered.push(lc);
            for _ in before..lowered.len() {
                origin.push(offset);
            }
        }
    }
    origin.push(content.len());

    let hit = lowered.find(needle_lower)?;
    let start = origin[hit];
    let end = origin[hit + needle_lower.len()];
    Some((start, end.saturating_sub(start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    async fn store() -> ConversationStore {
        ConversationStore::new(connect_in_memory().await)
    }

    async fn seed(store: &ConversationStore, directory: &str, contents: &[&str]) -> Conversation {
        let mut conversation = Conversation::new(directory);
        for (i, content) in contents.iter().enumerate() {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            conversation.push_message(role, *content);
        }
        store.put(&conversation).await.unwrap();
        conversation
    }

    #[tokio::test]
    async fn list_zero_limit_is_empty_not_error() {
        let store = store().await;
        seed(&store, "/a", &["hello"]).await;

        let results = list_conversations(&store, 0, None, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn list_oversized_limit_returns_everything() {
        let store = store().await;
        seed(&store, "/a", &["one"]).await;
        seed(&store, "/b", &["two"]).await;

        let results = list_conversations(&store, 10_000, None, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty() {
        let store = store().await;
        let results = list_conversations(&store, 10, None, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn list_path_filter_is_case_sensitive_substring() {
        let store = store().await;
        seed(&store, "/workspace/userguide", &["a"]).await;
        seed(&store, "/other/project", &["b"]).await;

        let results = list_conversations(&store, 10, Some("userguide"), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].directory, "/workspace/userguide");

        let results = list_conversations(&store, 10, Some("USERGUIDE"), None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn list_contains_filter_checks_message_bodies() {
        let store = store().await;
        seed(&store, "/a", &["talking about gitignore rules"]).await;
        seed(&store, "/b", &["nothing relevant"]).await;

        let results = list_conversations(&store, 10, None, Some("gitignore"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].directory, "/a");
    }

    #[tokio::test]
    async fn list_respects_limit() {
        let store = store().await;
        for i in 0..5 {
            seed(&store, &format!("/dir{i}"), &["msg"]).await;
        }
        let results = list_conversations(&store, 3, None, None).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_newest_first() {
        let store = store().await;
        let mut old = Conversation::new("/old");
        old.push_message(MessageRole::User, "GitIgnore question");
        old.updated_at = chrono::Utc::now() - chrono::Duration::hours(1);
        store.put(&old).await.unwrap();
        let new = seed(&store, "/new", &["more gitignore talk"]).await;

        let results = search_conversations(&store, "gitignore", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].summary.id, new.id);
        assert_eq!(results[1].summary.id, old.id);
    }

    #[tokio::test]
    async fn search_snippet_overlaps_the_match() {
        let store = store().await;
        let filler = "context ".repeat(40);
        seed(
            &store,
            "/workspace/userguide",
            &["first message", &format!("{filler}gitignore{filler}")],
        )
        .await;

        let results = search_conversations(&store, "gitignore", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].snippet.text.to_lowercase().contains("gitignore"));
        assert_eq!(results[0].matched_message, 1);
        assert_eq!(results[0].matched_role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn search_snippet_overlaps_after_length_changing_lowercase() {
        let store = store().await;
        // 'İ' (U+0130) is 2 bytes but lowercases to 3, so every copy before
        // the match shifts offsets found in the lowercased text.
        let prefix = "İ".repeat(100);
        let tail = " tail".repeat(60);
        seed(&store, "/unicode", &[&format!("{prefix} needle{tail}")]).await;

        let results = search_conversations(&store, "NEEDLE", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(
            results[0].snippet.text.contains("needle"),
            "snippet does not overlap the match: {:?}",
            results[0].snippet.text
        );
    }

    #[test]
    fn case_insensitive_span_is_in_original_bytes() {
        let content = format!("{} GitIgnore rest", "İ".repeat(10));
        let (start, len) = find_case_insensitive(&content, "gitignore").unwrap();
        assert_eq!(&content[start..start + len], "GitIgnore");
    }

    #[tokio::test]
    async fn search_skips_empty_conversations() {
        let store = store().await;
        let empty = Conversation::new("/empty");
        store.put(&empty).await.unwrap();

        let results = search_conversations(&store, "anything", 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_empty_query_is_invalid_argument() {
        let store = store().await;
        let err = search_conversations(&store, "", 10).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn search_skips_corrupted_bodies() {
        let store = store().await;
        let good = seed(&store, "/good", &["needle here"]).await;
        let bad = seed(&store, "/bad", &["needle there"]).await;

        sqlx::query("UPDATE conversations SET data = '{broken' WHERE id = ?")
            .bind(&bad.id)
            .execute(store.pool())
            .await
            .unwrap();

        let results = search_conversations(&store, "needle", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].summary.id, good.id);
    }
}
