//! Extractor view: paste text, preview generated metadata, save to the KB.

use agent_core::models::{ExtractedMetadata, SavedDocument};
use agent_core::Result;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::components::badges::TagChips;
use crate::components::text_input::TextInput;
use crate::themes::Theme;

pub const ANALYZE_FAILED: &str = "Failed to analyze content. Please try again.";
pub const SAVE_FAILED: &str = "Failed to save to Knowledge Base. Please try again.";

/// A finished extractor request, ready to be shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorNotice {
    Saved(String),
    Failed(&'static str),
}

#[derive(Debug, Default)]
pub struct ExtractorState {
    pub input: TextInput,
    pub result: Option<ExtractedMetadata>,
    pub analyzing: bool,
    pub saving: bool,
}

impl ExtractorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.analyzing || self.saving
    }

    /// Text to analyze, or `None` when blank or already busy.
    pub fn start_analyze(&mut self) -> Option<String> {
        if self.is_busy() || self.input.is_blank() {
            return None;
        }
        self.analyzing = true;
        Some(self.input.text().to_string())
    }

    /// Text to save, or `None` when blank or already busy.
    pub fn start_save(&mut self) -> Option<String> {
        if self.is_busy() || self.input.is_blank() {
            return None;
        }
        self.saving = true;
        Some(self.input.text().to_string())
    }

    pub fn on_extracted(&mut self, result: Result<ExtractedMetadata>) -> Option<ExtractorNotice> {
        self.analyzing = false;
        match result {
            Ok(meta) => {
                self.result = Some(meta);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "extract failed");
                Some(ExtractorNotice::Failed(ANALYZE_FAILED))
            }
        }
    }

    /// A successful save clears the pasted text and the preview.
    pub fn on_saved(&mut self, result: Result<SavedDocument>) -> ExtractorNotice {
        self.saving = false;
        match result {
            Ok(saved) => {
                self.input.clear();
                self.result = None;
                ExtractorNotice::Saved(saved.confirmation())
            }
            Err(e) => {
                tracing::warn!(error = %e, "extract and save failed");
                ExtractorNotice::Failed(SAVE_FAILED)
            }
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

pub fn render_extractor_view(frame: &mut Frame, area: Rect, state: &ExtractorState, theme: &Theme) {
    let [input_area, result_area, help_area] = Layout::vertical([
        Constraint::Percentage(60),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .areas(area);

    state.input.render(
        frame,
        input_area,
        "Content",
        "Paste your Groovy script, Impex, or Query here...",
        !state.is_busy(),
        theme,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(" Extracted Metadata ", theme.label));
    frame.render_widget(
        Paragraph::new(result_lines(state, theme))
            .block(block)
            .wrap(Wrap { trim: false }),
        result_area,
    );

    let help = if state.analyzing {
        Line::from(Span::styled(" Analyzing...", theme.info))
    } else if state.saving {
        Line::from(Span::styled(" Saving...", theme.info))
    } else {
        Line::from(vec![
            Span::styled(" Ctrl+E/F5 ", theme.label),
            Span::styled("Analyze   ", theme.dim),
            Span::styled("Ctrl+S/F6 ", theme.label),
            Span::styled("Save to KB", theme.dim),
        ])
    };
    frame.render_widget(Paragraph::new(help), help_area);
}

fn result_lines(state: &ExtractorState, theme: &Theme) -> Vec<Line<'static>> {
    let Some(meta) = &state.result else {
        return vec![Line::from(Span::styled(
            "Analyze content to preview its title, tags and summary.",
            theme.dim,
        ))];
    };

    let chips: Vec<Span<'static>> = TagChips::new(&meta.tags, theme)
        .to_spans()
        .into_iter()
        .map(|s| Span::styled(s.content.into_owned(), s.style))
        .collect();

    let mut tags = vec![Span::styled("Tags:    ", theme.label)];
    tags.extend(chips);

    vec![
        Line::from(vec![
            Span::styled("Title:   ", theme.label),
            Span::styled(meta.title.clone(), theme.bold),
        ]),
        Line::from(tags),
        Line::from(vec![
            Span::styled("Summary: ", theme.label),
            Span::styled(meta.summary.clone(), theme.text),
        ]),
    ]
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentError;
    use ratatui::{backend::TestBackend, Terminal};

    fn meta() -> ExtractedMetadata {
        ExtractedMetadata {
            title: "Update prices".into(),
            tags: vec!["impex".into(), "price".into()],
            summary: "Updates price rows".into(),
        }
    }

    #[test]
    fn test_blank_text_is_not_submitted() {
        let mut state = ExtractorState::new();
        state.input.insert_str("   \n ");
        assert_eq!(state.start_analyze(), None);
        assert_eq!(state.start_save(), None);
        assert!(!state.is_busy());
    }

    #[test]
    fn test_busy_blocks_second_request() {
        let mut state = ExtractorState::new();
        state.input.insert_str("INSERT_UPDATE PriceRow");
        assert_eq!(state.start_analyze().as_deref(), Some("INSERT_UPDATE PriceRow"));
        assert_eq!(state.start_save(), None);

        assert_eq!(state.on_extracted(Ok(meta())), None);
        assert!(!state.analyzing);
        assert_eq!(state.result.as_ref().unwrap().title, "Update prices");
    }

    #[test]
    fn test_analyze_failure_keeps_text() {
        let mut state = ExtractorState::new();
        state.input.insert_str("text");
        state.start_analyze();
        let notice = state.on_extracted(Err(AgentError::Stream("boom".into())));
        assert_eq!(notice, Some(ExtractorNotice::Failed(ANALYZE_FAILED)));
        assert_eq!(state.input.text(), "text");
    }

    #[test]
    fn test_save_success_clears_form() {
        let mut state = ExtractorState::new();
        state.input.insert_str("text");
        state.result = Some(meta());
        state.start_save();

        let notice = state.on_saved(Ok(SavedDocument {
            id: "d1".into(),
            title: "T".into(),
            tags: vec!["a".into()],
            summary: String::new(),
        }));
        match notice {
            ExtractorNotice::Saved(text) => assert!(text.contains("ID: d1")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(state.input.is_blank());
        assert!(state.result.is_none());
        assert!(!state.saving);
    }

    #[test]
    fn test_save_failure_keeps_form() {
        let mut state = ExtractorState::new();
        state.input.insert_str("text");
        state.start_save();
        let notice = state.on_saved(Err(AgentError::Stream("down".into())));
        assert_eq!(notice, ExtractorNotice::Failed(SAVE_FAILED));
        assert_eq!(state.input.text(), "text");
    }

    #[test]
    fn test_render_with_result() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let mut state = ExtractorState::new();
        state.result = Some(meta());

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_extractor_view(frame, area, &state, &theme);
            })
            .unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("Update prices"));
        assert!(rendered.contains("#impex"));
    }
}
