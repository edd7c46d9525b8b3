//! Editable text buffer with a cursor.
//!
//! Used for the chat prompt, the KB search box, the extractor text area and
//! every field of the edit form.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// A UTF-8 text buffer with a byte-offset cursor that always sits on a char
/// boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer pre-filled with `text`, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `true` when the buffer holds only whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Return the contents and leave the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert pasted text. `\r\n` and lone `\r` become `\n`.
    pub fn insert_str(&mut self, s: &str) {
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        self.text.insert_str(self.cursor, &normalized);
        self.cursor += normalized.len();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.text.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Start of the current line.
    pub fn move_home(&mut self) {
        self.cursor = self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
    }

    /// End of the current line.
    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |i| self.cursor + i);
    }

    /// Apply a plain editing key. Returns `false` for keys it does not own.
    ///
    /// `Enter` is never consumed; callers decide whether it submits or
    /// inserts a newline.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(c) if plain => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Cursor position as `(row, display column)`.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        (row, before[line_start..].width())
    }

    /// Draw the buffer inside a bordered box and, when `focused`, place the
    /// terminal cursor.
    ///
    /// The view scrolls vertically to keep the cursor row visible; long
    /// lines are not wrapped.
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        placeholder: &str,
        focused: bool,
        theme: &Theme,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.frame_style(focused))
            .title(Span::styled(format!(" {title} "), theme.label));
        let inner = block.inner(area);

        let (row, col) = self.cursor_row_col();
        let visible_rows = usize::from(inner.height.max(1));
        let scroll = row.saturating_sub(visible_rows - 1);

        let body = if self.text.is_empty() {
            Text::from(Line::from(Span::styled(placeholder.to_string(), theme.dim)))
        } else {
            Text::from(
                self.text
                    .split('\n')
                    .map(|l| Line::from(Span::styled(l.to_string(), theme.text)))
                    .collect::<Vec<_>>(),
            )
        };

        let scroll_y = u16::try_from(scroll).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(body).block(block).scroll((scroll_y, 0)), area);

        if focused && inner.width > 0 && inner.height > 0 {
            let x = inner.x + u16::try_from(col).unwrap_or(u16::MAX).min(inner.width - 1);
            let y = inner.y + u16::try_from(row - scroll).unwrap_or(0).min(inner.height - 1);
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
