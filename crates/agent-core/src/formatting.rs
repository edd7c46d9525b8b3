use chrono::{DateTime, NaiveDateTime};

/// Split a comma-separated tag string into trimmed, non-empty tags.
///
/// # Examples
///
/// ```
/// use agent_core::formatting::parse_tags;
///
/// assert_eq!(parse_tags("flexsearch, product ,, query"), vec!["flexsearch", "product", "query"]);
/// assert!(parse_tags("  ").is_empty());
/// ```
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tags for an editable comma-separated field.
///
/// ```
/// use agent_core::formatting::join_tags;
///
/// assert_eq!(join_tags(&["a".to_string(), "b".to_string()]), "a, b");
/// ```
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// Split tags into the first `max` shown on a card and the hidden remainder
/// count.
///
/// ```
/// use agent_core::formatting::tag_preview;
///
/// let tags: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
/// let (shown, more) = tag_preview(&tags, 3);
/// assert_eq!(shown.len(), 3);
/// assert_eq!(more, 2);
/// ```
pub fn tag_preview(tags: &[String], max: usize) -> (&[String], usize) {
    let shown = &tags[..tags.len().min(max)];
    (shown, tags.len() - shown.len())
}

/// Truncate `text` to at most `max_chars` characters, appending `…` when
/// anything was cut.
///
/// ```
/// use agent_core::formatting::truncate_chars;
///
/// assert_eq!(truncate_chars("hello world", 5), "hell…");
/// assert_eq!(truncate_chars("short", 10), "short");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Render a backend `created_at` value as a short date.
///
/// The backend writes naive local ISO-8601 timestamps (optionally with
/// fractional seconds); RFC 3339 values are accepted too. Unparseable input
/// is returned unchanged.
///
/// ```
/// use agent_core::formatting::format_created_at;
///
/// assert_eq!(format_created_at("2024-05-01T10:00:00.123456"), "May 01, 2024 10:00");
/// assert_eq!(format_created_at("2024-05-01T10:00:00+00:00"), "May 01, 2024 10:00");
/// assert_eq!(format_created_at("yesterday"), "yesterday");
/// ```
pub fn format_created_at(raw: &str) -> String {
    const OUT: &str = "%b %d, %Y %H:%M";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(OUT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(OUT).to_string();
    }
    raw.to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
