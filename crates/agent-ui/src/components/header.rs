use crate::app::View;
use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative sparkle string placed either side of the application title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

/// Number of session id characters shown in the header.
const SESSION_CHARS: usize = 8;

/// Application header rendering three lines:
///
/// 1. Application title with sparkle decorations (ALL CAPS).
/// 2. View tabs with their function keys, then `[ api | session ]`.
/// 3. A 60-column `=` separator.
pub struct Header<'a> {
    /// View whose tab is highlighted.
    pub active: View,
    /// Backend base URL.
    pub api_url: &'a str,
    /// Current chat session id.
    pub session_id: &'a str,
    /// Theme providing colour styles for each part of the header.
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    /// Construct a new header.
    pub fn new(active: View, api_url: &'a str, session_id: &'a str, theme: &'a Theme) -> Self {
        Self {
            active,
            api_url,
            session_id,
            theme,
        }
    }

    /// Render the header as a `Vec<Line>` containing exactly three lines.
    ///
    /// ```text
    /// ✦ ✧ ✦ ✧ KNOWLEDGE BASE AGENT ✦ ✧ ✦ ✧
    ///  F1 Chat  F2 Knowledge Base  F3 Extractor   [ localhost:8000 | 1b4e28ba ]
    /// ============================================================
    /// ```
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let mut tabs = Vec::new();
        for (i, view) in View::ALL.iter().enumerate() {
            let style = if *view == self.active {
                self.theme.tab_active
            } else {
                self.theme.tab
            };
            tabs.push(Span::styled(format!(" F{} {} ", i + 1, view.title()), style));
            tabs.push(Span::raw(" "));
        }

        let host = self
            .api_url
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/');
        let session: String = self.session_id.chars().take(SESSION_CHARS).collect();

        tabs.extend([
            Span::styled("  [ ", self.theme.label),
            Span::styled(host.to_string(), self.theme.value),
            Span::styled(" | ", self.theme.label),
            Span::styled(session, self.theme.value),
            Span::styled(" ]", self.theme.label),
        ]);

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header_sparkle),
                Span::styled(" KNOWLEDGE BASE AGENT ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header_sparkle),
            ]),
            Line::from(tabs),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
