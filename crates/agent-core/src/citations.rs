//! `[Source: id, id]` citation markers inside model answers.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Number of id characters shown on a source badge.
pub const BADGE_ID_CHARS: usize = 8;

fn source_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[Source:\s*([^\]]+)\]").expect("regex is valid"))
}

/// A run of answer content: plain text or a group of cited document ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Sources(Vec<String>),
}

/// Split `content` into text and citation segments, in order.
///
/// Empty text between adjacent markers is not emitted. A marker whose ids
/// are all blank still yields an (empty) `Sources` segment and is removed
/// from the text.
pub fn split_sources(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in source_pattern().captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(content[last..whole.start()].to_string()));
        }

        let ids = caps
            .get(1)
            .map(|m| parse_ids(m.as_str()))
            .unwrap_or_default();
        segments.push(Segment::Sources(ids));
        last = whole.end();
    }

    if last < content.len() {
        segments.push(Segment::Text(content[last..].to_string()));
    }

    segments
}

/// All cited ids in `content`, in order of appearance (duplicates kept).
pub fn cited_ids(content: &str) -> Vec<String> {
    split_sources(content)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Sources(ids) => Some(ids),
            Segment::Text(_) => None,
        })
        .flatten()
        .collect()
}

/// Rewrite every marker that spans a line break onto one line, ids joined
/// with `", "`. Single-line content is borrowed unchanged.
pub fn join_wrapped_markers(content: &str) -> Cow<'_, str> {
    if !content.contains('\n') {
        return Cow::Borrowed(content);
    }
    source_pattern().replace_all(content, |caps: &Captures<'_>| {
        let whole = &caps[0];
        if !whole.contains('\n') {
            return whole.to_string();
        }
        format!("[Source: {}]", parse_ids(&caps[1]).join(", "))
    })
}

fn parse_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Label shown on a source badge: `Source: <first 8 chars>...`.
pub fn badge_label(doc_id: &str) -> String {
    let short: String = doc_id.chars().take(BADGE_ID_CHARS).collect();
    format!("Source: {short}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_single_segment() {
        assert_eq!(
            split_sources("no citations here"),
            vec![Segment::Text("no citations here".into())]
        );
    }

    #[test]
    fn test_empty_content_has_no_segments() {
        assert!(split_sources("").is_empty());
    }

    #[test]
    fn test_marker_between_text() {
        let segs = split_sources("Use this query [Source: abc123, def456] and enjoy.");
        assert_eq!(
            segs,
            vec![
                Segment::Text("Use this query ".into()),
                Segment::Sources(vec!["abc123".into(), "def456".into()]),
                Segment::Text(" and enjoy.".into()),
            ]
        );
    }

    #[test]
    fn test_marker_at_end_and_blank_ids_dropped() {
        let segs = split_sources("Answer.[Source:  a1 , , b2 ]");
        assert_eq!(
            segs,
            vec![
                Segment::Text("Answer.".into()),
                Segment::Sources(vec!["a1".into(), "b2".into()]),
            ]
        );
    }

    #[test]
    fn test_adjacent_markers() {
        let segs = split_sources("[Source: x][Source:y]");
        assert_eq!(
            segs,
            vec![
                Segment::Sources(vec!["x".into()]),
                Segment::Sources(vec!["y".into()]),
            ]
        );
    }

    #[test]
    fn test_unclosed_marker_stays_text() {
        let segs = split_sources("broken [Source: abc");
        assert_eq!(segs, vec![Segment::Text("broken [Source: abc".into())]);
    }

    #[test]
    fn test_cited_ids_in_order() {
        let ids = cited_ids("a [Source: 1, 2] b [Source: 3]");
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_join_wrapped_markers() {
        let joined = join_wrapped_markers("see [Source: a1,\n  b2] and [Source: c3]");
        assert_eq!(joined, "see [Source: a1, b2] and [Source: c3]");
        assert!(matches!(
            join_wrapped_markers("plain [Source: x]"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_badge_label_truncates() {
        assert_eq!(badge_label("0123456789abcdef"), "Source: 01234567...");
        assert_eq!(badge_label("abc"), "Source: abc...");
    }
}
