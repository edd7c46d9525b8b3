//! Chat view: transcript, thinking steps, citations and the prompt box.

use std::collections::HashSet;

use agent_core::citations::{badge_label, cited_ids};
use agent_core::transcript::{ChatMessage, Conversation, Role};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::components::rich_text::{content_lines, plain_lines, wrap_lines};
use crate::components::text_input::TextInput;
use crate::themes::Theme;

/// Most prompt lines shown before the box scrolls.
const MAX_INPUT_LINES: usize = 6;

/// Most source badges reachable with `Alt+1..9`.
pub const MAX_SOURCE_KEYS: usize = 9;

// ── ChatState ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ChatState {
    pub conversation: Conversation,
    pub input: TextInput,
    /// Indices of model messages whose thinking steps are expanded.
    pub show_thinking: HashSet<usize>,
    /// Message `Ctrl+T` acts on; `None` follows the newest one.
    pub thinking_focus: Option<usize>,
    /// Rows scrolled up from the bottom; `0` follows new output.
    pub scroll_back: usize,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the newest settled model message that has thinking steps.
    pub fn latest_with_thinking(&self) -> Option<usize> {
        self.conversation
            .messages()
            .iter()
            .rposition(ChatMessage::has_hidden_thinking)
    }

    /// Message the thinking toggle currently applies to.
    pub fn focused_thinking(&self) -> Option<usize> {
        match self.thinking_focus {
            Some(idx) if self.has_thinking(idx) => Some(idx),
            _ => self.latest_with_thinking(),
        }
    }

    /// Move the toggle focus to the previous (`older`) or next answer that
    /// has thinking steps. Stays put at either end.
    pub fn move_thinking_focus(&mut self, older: bool) {
        let Some(current) = self.focused_thinking() else {
            return;
        };
        let messages = self.conversation.messages();
        let target = if older {
            messages[..current]
                .iter()
                .rposition(ChatMessage::has_hidden_thinking)
        } else {
            messages
                .iter()
                .enumerate()
                .skip(current + 1)
                .find(|(_, m)| m.has_hidden_thinking())
                .map(|(i, _)| i)
        };
        if let Some(idx) = target {
            self.thinking_focus = Some(idx);
        }
    }

    fn has_thinking(&self, idx: usize) -> bool {
        self.conversation
            .messages()
            .get(idx)
            .is_some_and(ChatMessage::has_hidden_thinking)
    }

    /// Expand or collapse the steps of message `idx`.
    pub fn toggle_thinking(&mut self, idx: usize) {
        if !self.show_thinking.remove(&idx) {
            self.show_thinking.insert(idx);
        }
    }

    /// Document ids cited by the newest settled answer that cites anything.
    pub fn latest_sources(&self) -> Vec<String> {
        self.conversation
            .messages()
            .iter()
            .rev()
            .filter(|m| m.role == Role::Model && !m.is_thinking)
            .map(|m| cited_ids(&m.content))
            .find(|ids| !ids.is_empty())
            .unwrap_or_default()
    }

    /// Forget the transcript after the session rotated.
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.show_thinking.clear();
        self.thinking_focus = None;
        self.scroll_back = 0;
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Render the chat view into `area`.
pub fn render_chat_view(frame: &mut Frame, area: Rect, state: &ChatState, theme: &Theme) {
    let input_rows = state.input.line_count().clamp(1, MAX_INPUT_LINES);
    let input_height = u16::try_from(input_rows).unwrap_or(1) + 2;
    let [transcript_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(input_height)]).areas(area);

    render_transcript(frame, transcript_area, state, theme);

    let loading = state.conversation.is_loading();
    let title = if loading {
        "Waiting for answer..."
    } else {
        "Message (Enter send, Alt+Enter newline)"
    };
    state
        .input
        .render(frame, input_area, title, "Ask a question...", !loading, theme);
}

fn render_transcript(frame: &mut Frame, area: Rect, state: &ChatState, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(" Chat ", theme.label));
    let inner = block.inner(area);

    let lines = if state.conversation.is_empty() {
        empty_state_lines(theme)
    } else {
        transcript_lines(state, theme)
    };

    let lines = wrap_lines(lines, inner.width);
    let total = lines.len();
    let visible = usize::from(inner.height);
    let max_scroll = total.saturating_sub(visible);
    let top = max_scroll.saturating_sub(state.scroll_back);

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

fn empty_state_lines(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "How can I help you with Hybris today?",
            theme.bold,
        )),
        Line::from(Span::styled(
            "Ask for FlexSearch queries, Groovy scripts, or Impex.",
            theme.dim,
        )),
    ]
}

/// Build every transcript line, including the source key legend.
pub fn transcript_lines(state: &ChatState, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, message) in state.conversation.messages().iter().enumerate() {
        match message.role {
            Role::User => {
                lines.push(Line::from(Span::styled("▶ You", theme.user_label)));
                lines.extend(plain_lines(&message.content, theme));
            }
            Role::Model => {
                lines.push(Line::from(Span::styled("◆ Agent", theme.model_label)));
                model_lines(&mut lines, idx, message, state, theme);
            }
        }
        lines.push(Line::from(""));
    }

    let sources = state.latest_sources();
    if !sources.is_empty() {
        let mut legend = vec![Span::styled("Open source: ", theme.dim)];
        for (i, id) in sources.iter().take(MAX_SOURCE_KEYS).enumerate() {
            legend.push(Span::styled(format!("Alt+{} ", i + 1), theme.label));
            legend.push(Span::styled(format!(" {} ", badge_label(id)), theme.source_badge));
            legend.push(Span::raw("  "));
        }
        lines.push(Line::from(legend));
    }

    lines
}

fn model_lines(
    lines: &mut Vec<Line<'static>>,
    idx: usize,
    message: &ChatMessage,
    state: &ChatState,
    theme: &Theme,
) {
    if message.is_thinking {
        lines.push(Line::from(Span::styled("Thinking...", theme.thinking)));
        lines.extend(step_lines(&message.thinking_steps, theme));
        return;
    }

    if message.has_hidden_thinking() {
        let expanded = state.show_thinking.contains(&idx);
        let focused = state.focused_thinking() == Some(idx);
        let toggle = match (expanded, focused) {
            (false, true) => "▸ Show thinking (Ctrl+T)",
            (true, true) => "▾ Hide thinking (Ctrl+T)",
            (false, false) => "▸ Show thinking",
            (true, false) => "▾ Hide thinking",
        };
        let style = if focused { theme.selection } else { theme.info };
        lines.push(Line::from(Span::styled(toggle, style)));
        if expanded {
            lines.extend(step_lines(&message.thinking_steps, theme));
        }
    }

    lines.extend(content_lines(&message.content, true, theme));
}

fn step_lines(steps: &[String], theme: &Theme) -> Vec<Line<'static>> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| Line::from(Span::styled(format!("  {}. {step}", i + 1), theme.thinking)))
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::models::StreamEvent;
    use ratatui::{backend::TestBackend, Terminal};

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn answered(state: &mut ChatState, question: &str, steps: &[&str], answer: &str) {
        state.conversation.begin_turn(question).unwrap();
        for s in steps {
            state.conversation.apply(StreamEvent::Step {
                content: s.to_string(),
            });
        }
        state.conversation.apply(StreamEvent::Answer {
            content: answer.to_string(),
        });
        state.conversation.finish();
    }

    #[test]
    fn test_thinking_placeholder_lists_numbered_steps() {
        let theme = Theme::dark();
        let mut state = ChatState::new();
        state.conversation.begin_turn("hi").unwrap();
        state.conversation.apply(StreamEvent::Step {
            content: "Reading your message...".into(),
        });

        let text = text_of(&transcript_lines(&state, &theme));
        assert!(text.contains(&"Thinking...".to_string()));
        assert!(text.contains(&"  1. Reading your message...".to_string()));
    }

    #[test]
    fn test_thinking_toggle_for_settled_answer() {
        let theme = Theme::dark();
        let mut state = ChatState::new();
        answered(&mut state, "q", &["step one"], "answer");

        let idx = state.latest_with_thinking().unwrap();
        assert_eq!(idx, 1);
        let collapsed = text_of(&transcript_lines(&state, &theme));
        assert!(collapsed.contains(&"▸ Show thinking (Ctrl+T)".to_string()));
        assert!(!collapsed.iter().any(|l| l.contains("step one")));

        state.toggle_thinking(idx);
        let expanded = text_of(&transcript_lines(&state, &theme));
        assert!(expanded.contains(&"▾ Hide thinking (Ctrl+T)".to_string()));
        assert!(expanded.contains(&"  1. step one".to_string()));

        state.toggle_thinking(idx);
        assert!(state.show_thinking.is_empty());
    }

    #[test]
    fn test_latest_sources_uses_newest_citing_answer() {
        let mut state = ChatState::new();
        answered(&mut state, "a", &[], "see [Source: old1]");
        answered(&mut state, "b", &[], "see [Source: new1, new2]");
        answered(&mut state, "c", &[], "no citations");
        assert_eq!(state.latest_sources(), vec!["new1", "new2"]);
    }

    #[test]
    fn test_source_legend_rendered() {
        let theme = Theme::dark();
        let mut state = ChatState::new();
        answered(&mut state, "a", &[], "see [Source: 0123456789]");
        let text = text_of(&transcript_lines(&state, &theme));
        let legend = text.last().unwrap();
        assert!(legend.contains("Alt+1"), "got {legend}");
        assert!(legend.contains("Source: 01234567..."), "got {legend}");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = ChatState::new();
        answered(&mut state, "q", &["s"], "a");
        state.toggle_thinking(1);
        state.thinking_focus = Some(1);
        state.scroll_back = 4;
        state.reset();
        assert!(state.conversation.is_empty());
        assert!(state.show_thinking.is_empty());
        assert_eq!(state.thinking_focus, None);
        assert_eq!(state.scroll_back, 0);
    }

    #[test]
    fn test_thinking_focus_reaches_older_answers() {
        let theme = Theme::dark();
        let mut state = ChatState::new();
        answered(&mut state, "first", &["old step"], "one");
        answered(&mut state, "plain", &[], "two");
        answered(&mut state, "third", &["new step"], "three");
        assert_eq!(state.focused_thinking(), Some(5));

        state.move_thinking_focus(true);
        assert_eq!(state.focused_thinking(), Some(1));
        // Already the oldest.
        state.move_thinking_focus(true);
        assert_eq!(state.focused_thinking(), Some(1));

        let idx = state.focused_thinking().unwrap();
        state.toggle_thinking(idx);
        let text = text_of(&transcript_lines(&state, &theme));
        assert!(text.contains(&"▾ Hide thinking (Ctrl+T)".to_string()));
        assert!(text.contains(&"  1. old step".to_string()));
        assert!(text.contains(&"▸ Show thinking".to_string()));
        assert!(!text.iter().any(|l| l.contains("new step")));

        state.move_thinking_focus(false);
        assert_eq!(state.focused_thinking(), Some(5));
    }

    #[test]
    fn test_newest_row_visible_after_long_wrapped_answer() {
        let backend = TestBackend::new(27, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let mut state = ChatState::new();
        let paragraph = "abcdefghij ".repeat(40);
        let answer = format!("{}\n\nLAST-LINE", vec![paragraph.trim_end(); 6].join("\n\n"));
        answered(&mut state, "long?", &[], &answer);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chat_view(frame, area, &state, &theme);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rendered: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("LAST-LINE"), "newest row scrolled out of view");
    }

    #[test]
    fn test_render_chat_view_does_not_panic() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let mut state = ChatState::new();
        answered(
            &mut state,
            "how?",
            &["one", "two"],
            "Use:\n```impex\nINSERT_UPDATE Product;code\n```\n[Source: abc]",
        );
        state.scroll_back = 100;

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chat_view(frame, area, &state, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_empty_state_shows_greeting() {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let state = ChatState::new();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chat_view(frame, area, &state, &theme);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rendered: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("How can I help you with Hybris today?"));
    }
}
