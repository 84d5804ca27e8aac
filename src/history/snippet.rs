//! Bounded excerpts of message content around a search match.

use crate::config::SNIPPET_BUDGET;

/// A bounded excerpt of message content surrounding a search match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Excerpt text, with `…` markers where leading/trailing text was cut.
    pub text: String,
}

impl std::fmt::Display for Snippet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Extract an excerpt of `content` centered on the match at byte offset
/// `match_start` with byte length `match_len`.
///
/// The window holds at most [`SNIPPET_BUDGET`] characters, expanded to char
/// boundaries and trimmed outward to word boundaries so the excerpt never
/// starts or ends mid-word (unless the match itself does). Safe on multi-byte
/// text: offsets are clamped to char boundaries before any slicing.
pub fn extract(content: &str, match_start: usize, match_len: usize) -> Snippet {
    // Clamp the match span to char boundaries.
    let mut ms = match_start.min(content.len());
    while ms > 0 && !content.is_char_boundary(ms) {
        ms -= 1;
    }
    let mut me = match_start.saturating_add(match_len).min(content.len());
    while me < content.len() && !content.is_char_boundary(me) {
        me += 1;
    }

    let match_chars = content[ms..me].chars().count();

    // A match longer than the budget: show its head and mark both cuts.
    if match_chars >= SNIPPET_BUDGET {
        let head_end = char_offset(content, ms, SNIPPET_BUDGET);
        let mut text = String::new();
        if ms > 0 {
            text.push('…');
        }
        text.push_str(&content[ms..head_end]);
        if head_end < content.len() {
            text.push('…');
        }
        return Snippet { text };
    }

    // Spread the remaining budget around the match, giving unused slack from
    // one side to the other when the match sits near an edge.
    let side = (SNIPPET_BUDGET - match_chars) / 2;
    let chars_before = content[..ms].chars().count();
    let take_before = chars_before.min(side);
    let mut start = char_offset_back(content, ms, take_before);
    let budget_after = SNIPPET_BUDGET - match_chars - take_before;
    let mut end = char_offset(content, me, budget_after);
    if end == content.len() {
        let used = content[start..end].chars().count();
        let slack = SNIPPET_BUDGET - used;
        start = char_offset_back(content, start, slack);
    }

    // Trim partial words at the cuts, never eating into the match itself. A
    // cut that already landed on a word boundary is left alone.
    let cut_mid_word_start = start > 0
        && content[..start]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_whitespace());
    if cut_mid_word_start {
        if let Some(ws) = content[start..ms].find(char::is_whitespace) {
            let after_ws = content[start + ws..]
                .char_indices()
                .nth(1)
                .map(|(b, _)| start + ws + b)
                .unwrap_or(ms);
            start = after_ws.min(ms);
        }
    }
    let cut_mid_word_end = end < content.len()
        && content[end..].chars().next().is_some_and(|c| !c.is_whitespace());
    if cut_mid_word_end {
        if let Some(ws) = content[me..end].rfind(char::is_whitespace) {
            end = me + ws;
        }
    }

    let mut text = String::new();
    if start > 0 {
        text.push('…');
    }
    text.push_str(content[start..end].trim());
    if end < content.len() {
        text.push('…');
    }

    Snippet { text }
}

/// Byte offset `n` characters forward of `from` (clamped to the end).
fn char_offset(content: &str, from: usize, n: usize) -> usize {
    content[from..]
        .char_indices()
        .nth(n)
        .map(|(b, _)| from + b)
        .unwrap_or(content.len())
}

/// Byte offset `n` characters back from `from` (clamped to the start).
fn char_offset_back(content: &str, from: usize, n: usize) -> usize {
    let mut offset = from;
    for _ in 0..n {
        match content[..offset].char_indices().next_back() {
            Some((b, _)) => offset = b,
            None => return 0,
        }
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_returned_whole() {
        let content = "a short message about gitignore files";
        let offset = content.find("gitignore").unwrap();
        let snippet = extract(content, offset, "gitignore".len());
        assert_eq!(snippet.text, content);
    }

    #[test]
    fn long_content_is_bounded_with_ellipses() {
        let filler = "word ".repeat(50);
        let content = format!("{filler}needle{filler}");
        let offset = content.find("needle").unwrap();
        let snippet = extract(&content, offset, "needle".len());

        assert!(snippet.text.contains("needle"));
        assert!(snippet.text.starts_with('…'));
        assert!(snippet.text.ends_with('…'));
        // Budget plus the two ellipsis markers.
        assert!(snippet.text.chars().count() <= SNIPPET_BUDGET + 2);
    }

    #[test]
    fn match_at_start_has_no_leading_ellipsis() {
        let content = format!("needle {}", "tail ".repeat(50));
        let snippet = extract(&content, 0, "needle".len());
        assert!(snippet.text.starts_with("needle"));
        assert!(snippet.text.ends_with('…'));
    }

    #[test]
    fn match_at_end_has_no_trailing_ellipsis() {
        let content = format!("{}needle", "head ".repeat(50));
        let offset = content.find("needle").unwrap();
        let snippet = extract(&content, offset, "needle".len());
        assert!(snippet.text.starts_with('…'));
        assert!(snippet.text.ends_with("needle"));
    }

    #[test]
    fn trims_to_word_boundaries() {
        let filler = "abcdefghij ".repeat(20);
        let content = format!("{filler}needle {filler}");
        let offset = content.find("needle").unwrap();
        let snippet = extract(&content, offset, "needle".len());

        // No partial words at either cut: every token is a full filler word
        // or the match.
        for token in snippet.text.trim_matches('…').split_whitespace() {
            assert!(token == "abcdefghij" || token == "needle", "partial token: {token}");
        }
    }

    #[test]
    fn multibyte_text_never_splits_characters() {
        let filler = "héllø wörld ünïcode ".repeat(20);
        let content = format!("{filler}nädel {filler}");
        let offset = content.find("nädel").unwrap();
        let snippet = extract(&content, offset, "nädel".len());
        assert!(snippet.text.contains("nädel"));
        // Building the String would have panicked on a split char; also make
        // sure the budget held in characters, not bytes.
        assert!(snippet.text.chars().count() <= SNIPPET_BUDGET + 2);
    }

    #[test]
    fn oversized_match_is_truncated_head() {
        let content = "x".repeat(SNIPPET_BUDGET * 2);
        let snippet = extract(&content, 0, content.len());
        assert_eq!(snippet.text.chars().count(), SNIPPET_BUDGET + 1);
        assert!(snippet.text.ends_with('…'));
    }

    #[test]
    fn offset_inside_multibyte_char_is_clamped() {
        let content = "é needle";
        // Byte offset 1 is inside 'é'.
        let snippet = extract(content, 1, 3);
        assert!(!snippet.text.is_empty());
    }
}
