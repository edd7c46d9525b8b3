use agent_core::models::DocStatus;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned as the safe
/// default.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Complete theme definition carrying all UI styles used by agent-ui
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_sparkle: Style,
    pub separator: Style,
    pub tab: Style,
    pub tab_active: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Chat ─────────────────────────────────────────────────────────────────
    pub user_label: Style,
    pub model_label: Style,
    /// Placeholder and thinking step lines.
    pub thinking: Style,
    /// Fenced code blocks in message and document content.
    pub code: Style,
    /// `Source: …` citation badges.
    pub source_badge: Style,

    // ── Knowledge base ───────────────────────────────────────────────────────
    pub tag: Style,
    pub tag_selected: Style,
    pub ai_marker: Style,
    pub selection: Style,

    // ── Frames ───────────────────────────────────────────────────────────────
    pub border: Style,
    pub border_focus: Style,
    pub danger: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_sparkle: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),
            tab: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            user_label: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            model_label: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            thinking: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            code: Style::default().fg(Color::LightGreen).bg(Color::Black),
            source_badge: Style::default()
                .fg(Color::Black)
                .bg(Color::LightBlue),

            tag: Style::default().fg(Color::LightBlue),
            tag_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::LightBlue),
            ai_marker: Style::default().fg(Color::Magenta),
            selection: Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),

            border: Style::default().fg(Color::DarkGray),
            border_focus: Style::default().fg(Color::Cyan),
            danger: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text and bright accent colours so that content
    /// remains legible against a white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_sparkle: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),
            tab: Style::default().fg(Color::DarkGray),
            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            user_label: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            model_label: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            thinking: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            code: Style::default().fg(Color::Black).bg(Color::Gray),
            source_badge: Style::default().fg(Color::White).bg(Color::Blue),

            tag: Style::default().fg(Color::Blue),
            tag_selected: Style::default().fg(Color::White).bg(Color::Blue),
            ai_marker: Style::default().fg(Color::Magenta),
            selection: Style::default()
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD),

            border: Style::default().fg(Color::Gray),
            border_focus: Style::default().fg(Color::Blue),
            danger: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Classic terminal theme using only the basic 8-colour ANSI palette.
    ///
    /// Avoids bold modifiers to maintain a retro aesthetic and maximise
    /// compatibility with minimal terminal emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_sparkle: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),
            tab: Style::default().fg(Color::White),
            tab_active: Style::default().fg(Color::Black).bg(Color::Cyan),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            user_label: Style::default().fg(Color::Blue),
            model_label: Style::default().fg(Color::Cyan),
            thinking: Style::default().fg(Color::Gray),
            code: Style::default().fg(Color::Green),
            source_badge: Style::default().fg(Color::Black).bg(Color::Cyan),

            tag: Style::default().fg(Color::Cyan),
            tag_selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            ai_marker: Style::default().fg(Color::Magenta),
            selection: Style::default().fg(Color::Black).bg(Color::White),

            border: Style::default().fg(Color::DarkGray),
            border_focus: Style::default().fg(Color::Cyan),
            danger: Style::default().fg(Color::White).bg(Color::Red),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Badge style for a document review status.
    pub fn status_style(&self, status: DocStatus) -> Style {
        match status {
            DocStatus::Verified => self.success,
            DocStatus::Unverified => self.warning,
        }
    }

    /// Border style for a frame that may hold focus.
    pub fn frame_style(&self, focused: bool) -> Style {
        if focused {
            self.border_focus
        } else {
            self.border
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.warning.fg, Some(Color::Yellow));
        assert_eq!(t.error.fg, Some(Color::Red));
        assert!(t.thinking.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.border_focus.fg, Some(Color::Blue));
    }

    #[test]
    fn test_classic_theme_has_no_bold() {
        let t = Theme::classic();
        assert!(!t.bold.add_modifier.contains(Modifier::BOLD));
        assert!(!t.header.add_modifier.contains(Modifier::BOLD));
        assert!(!t.danger.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(!Theme::from_name("classic")
            .header
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    #[test]
    fn test_status_style() {
        let t = Theme::dark();
        assert_eq!(t.status_style(DocStatus::Verified).fg, Some(Color::Green));
        assert_eq!(t.status_style(DocStatus::Unverified).fg, Some(Color::Yellow));
    }

    #[test]
    fn test_frame_style() {
        let t = Theme::dark();
        assert_eq!(t.frame_style(true).fg, Some(Color::Cyan));
        assert_eq!(t.frame_style(false).fg, Some(Color::DarkGray));
    }
}
