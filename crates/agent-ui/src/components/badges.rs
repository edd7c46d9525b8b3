use crate::themes::Theme;
use agent_core::formatting::tag_preview;
use agent_core::models::DocStatus;
use ratatui::text::Span;

/// Number of tags shown on a document card before collapsing into `+N`.
pub const CARD_TAGS: usize = 3;

// ── StatusBadge ──────────────────────────────────────────────────────────────

/// Upper-cased review status with an icon.
///
/// | Status     | Text           |
/// |------------|----------------|
/// | verified   | `✓ VERIFIED`   |
/// | unverified | `⚠ UNVERIFIED` |
pub struct StatusBadge<'a> {
    pub status: DocStatus,
    pub theme: &'a Theme,
}

impl<'a> StatusBadge<'a> {
    pub fn new(status: DocStatus, theme: &'a Theme) -> Self {
        Self { status, theme }
    }

    pub fn icon(&self) -> &'static str {
        match self.status {
            DocStatus::Verified => "✓",
            DocStatus::Unverified => "⚠",
        }
    }

    pub fn to_span(&self) -> Span<'static> {
        Span::styled(
            format!(
                "{} {}",
                self.icon(),
                self.status.as_str().to_uppercase()
            ),
            self.theme.status_style(self.status),
        )
    }
}

// ── TagChips ─────────────────────────────────────────────────────────────────

/// A row of `#tag` chips, optionally truncated to the first `max` tags.
pub struct TagChips<'a> {
    pub tags: &'a [String],
    /// `None` shows every tag.
    pub max: Option<usize>,
    pub theme: &'a Theme,
}

impl<'a> TagChips<'a> {
    pub fn new(tags: &'a [String], theme: &'a Theme) -> Self {
        Self {
            tags,
            max: None,
            theme,
        }
    }

    /// Card variant: first [`CARD_TAGS`] tags plus a `+N` counter.
    pub fn card(tags: &'a [String], theme: &'a Theme) -> Self {
        Self {
            tags,
            max: Some(CARD_TAGS),
            theme,
        }
    }

    pub fn to_spans(&self) -> Vec<Span<'a>> {
        let (shown, hidden) = match self.max {
            Some(max) => tag_preview(self.tags, max),
            None => (self.tags, 0),
        };

        let mut spans = Vec::with_capacity(shown.len() * 2 + 1);
        for (i, tag) in shown.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(format!("#{tag}"), self.theme.tag));
        }
        if hidden > 0 {
            spans.push(Span::styled(format!(" +{hidden}"), self.theme.dim));
        }
        spans
    }
}

// ── AiMarker ─────────────────────────────────────────────────────────────────

/// The "Added by AI" marker shown on AI-created documents.
pub fn ai_marker(theme: &Theme) -> Span<'static> {
    Span::styled("✦ Added by AI", theme.ai_marker)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn joined(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_status_badge_text() {
        let theme = Theme::dark();
        let span = StatusBadge::new(DocStatus::Unverified, &theme).to_span();
        assert_eq!(span.content, "⚠ UNVERIFIED");
        assert_eq!(span.style, theme.warning);

        let span = StatusBadge::new(DocStatus::Verified, &theme).to_span();
        assert_eq!(span.content, "✓ VERIFIED");
    }

    #[test]
    fn test_card_chips_collapse_extra_tags() {
        let theme = Theme::dark();
        let t = tags(&["impex", "price", "europe", "b2b", "sap"]);
        let spans = TagChips::card(&t, &theme).to_spans();
        assert_eq!(joined(&spans), "#impex #price #europe +2");
    }

    #[test]
    fn test_full_chips() {
        let theme = Theme::dark();
        let t = tags(&["a", "b", "c", "d"]);
        assert_eq!(joined(&TagChips::new(&t, &theme).to_spans()), "#a #b #c #d");
    }

    #[test]
    fn test_no_tags_renders_nothing() {
        let theme = Theme::dark();
        assert!(TagChips::card(&[], &theme).to_spans().is_empty());
    }
}
