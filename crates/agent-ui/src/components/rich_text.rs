//! Markdown rendering of model answers and document content.
//!
//! [`content_lines`] maps the `pulldown-cmark` event stream onto styled
//! ratatui lines; [`wrap_lines`] breaks them at word boundaries so callers
//! know the exact row count before scrolling.

use std::borrow::Cow;

use agent_core::citations::{badge_label, join_wrapped_markers, split_sources, Segment};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::themes::Theme;

/// Render markdown `content` into styled lines.
///
/// With `citations` on, `[Source: …]` markers outside code become badges.
pub fn content_lines(content: &str, citations: bool, theme: &Theme) -> Vec<Line<'static>> {
    let content: Cow<'_, str> = if citations {
        join_wrapped_markers(content)
    } else {
        Cow::Borrowed(content)
    };

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut out = MarkdownLines::new(citations, theme);
    for event in Parser::new_ext(&content, options) {
        out.event(event);
    }
    out.finish()
}

/// Lines shown verbatim, one per `\n` (user messages).
pub fn plain_lines(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    content
        .split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), theme.text)))
        .collect()
}

// ── Markdown → lines ─────────────────────────────────────────────────────────

struct MarkdownLines<'t> {
    theme: &'t Theme,
    citations: bool,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    /// Inline text not yet turned into spans, all in `pending_style`.
    pending: String,
    pending_style: Style,
    styles: Vec<Style>,
    /// One entry per open list: the next ordinal, `None` for bullets.
    lists: Vec<Option<u64>>,
    item_marker: Option<String>,
    quote_depth: usize,
    code: Option<String>,
}

impl<'t> MarkdownLines<'t> {
    fn new(citations: bool, theme: &'t Theme) -> Self {
        Self {
            theme,
            citations,
            lines: Vec::new(),
            current: Vec::new(),
            pending: String::new(),
            pending_style: theme.text,
            styles: Vec::new(),
            lists: Vec::new(),
            item_marker: None,
            quote_depth: 0,
            code: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.theme.text)
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        self.flush_text();
        let next = f(self.style());
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        self.flush_text();
        self.styles.pop();
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(buf) = self.code.as_mut() {
                    buf.push_str(&text);
                } else {
                    self.text(&text);
                }
            }
            Event::Code(code) => {
                self.flush_text();
                self.open_line();
                self.current
                    .push(Span::styled(code.to_string(), self.theme.code));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak | Event::HardBreak => self.end_line(),
            Event::Rule => {
                self.gap();
                self.lines
                    .push(Line::from(Span::styled("─".repeat(24), self.theme.dim)));
            }
            Event::TaskListMarker(done) => self.text(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.gap(),
            Tag::Heading { .. } => {
                self.gap();
                let bold = self.theme.bold;
                self.push_style(|_| bold);
            }
            Tag::BlockQuote { .. } => {
                self.gap();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.gap();
                let label = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                        lang.trim().to_string()
                    }
                    _ => "code".to_string(),
                };
                self.lines.push(Line::from(Span::styled(
                    format!("┌── {label}"),
                    self.theme.dim,
                )));
                self.code = Some(String::new());
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.gap();
                } else {
                    self.end_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.end_line();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.item_marker = Some(marker);
            }
            Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } | Tag::Image { .. } => {
                let link = self.theme.info.add_modifier(Modifier::UNDERLINED);
                self.push_style(|_| link);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Item => self.end_line(),
            TagEnd::Heading(_) => {
                self.pop_style();
                self.end_line();
            }
            TagEnd::BlockQuote { .. } => {
                self.end_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => self.close_code(),
            TagEnd::List(_) => {
                self.end_line();
                self.lists.pop();
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => self.pop_style(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        if style != self.pending_style {
            self.flush_text();
            self.pending_style = style;
        }
        self.pending.push_str(text);
    }

    /// Turn buffered text into spans. Markers split over several text
    /// events are whole again by the time they get here.
    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.open_line();
        let text = std::mem::take(&mut self.pending);
        let style = self.pending_style;
        if !self.citations {
            self.current.push(Span::styled(text, style));
            return;
        }
        for segment in split_sources(&text) {
            match segment {
                Segment::Text(text) => self.current.push(Span::styled(text, style)),
                Segment::Sources(ids) => {
                    for (i, id) in ids.iter().enumerate() {
                        if i > 0 {
                            self.current.push(Span::raw(" "));
                        }
                        self.current.push(Span::styled(
                            format!(" {} ", badge_label(id)),
                            self.theme.source_badge,
                        ));
                    }
                }
            }
        }
    }

    /// Emit the quote bars and list indent when a line gets its first span.
    fn open_line(&mut self) {
        if !self.current.is_empty() {
            return;
        }
        for _ in 0..self.quote_depth {
            self.current.push(Span::styled("│ ", self.theme.dim));
        }
        if self.lists.is_empty() {
            return;
        }
        let indent = "  ".repeat(self.lists.len() - 1);
        match self.item_marker.take() {
            Some(marker) => {
                self.current
                    .push(Span::styled(format!("{indent}{marker}"), self.theme.label));
            }
            None => self.current.push(Span::raw(format!("{indent}  "))),
        }
    }

    fn end_line(&mut self) {
        self.flush_text();
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    /// Blank line between top-level blocks.
    fn gap(&mut self) {
        self.end_line();
        if !self.lists.is_empty() {
            return;
        }
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn close_code(&mut self) {
        let Some(body) = self.code.take() else {
            return;
        };
        let body = body.strip_suffix('\n').unwrap_or(&body);
        for line in body.split('\n') {
            self.lines.push(Line::from(vec![
                Span::styled("│ ", self.theme.dim),
                Span::styled(line.to_string(), self.theme.code),
            ]));
        }
        self.lines
            .push(Line::from(Span::styled("└──", self.theme.dim)));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.end_line();
        self.close_code();
        self.lines
    }
}

// ── Wrapping ─────────────────────────────────────────────────────────────────

/// Break `lines` at word boundaries so none is wider than `width` columns.
///
/// Whitespace at a break is dropped and a word longer than a whole row is
/// split between characters. The result renders unwrapped, one row per line.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        if line.width() <= width {
            out.push(line);
            continue;
        }

        let mut row = Row::default();
        for span in &line.spans {
            for piece in pieces(&span.content) {
                let w = piece.width();
                if row.width + w <= width {
                    row.push(piece, span.style, w);
                } else if piece.trim().is_empty() {
                    row.flush_into(&mut out);
                } else if w <= width {
                    row.flush_into(&mut out);
                    row.push(piece, span.style, w);
                } else {
                    row.flush_into(&mut out);
                    for ch in piece.chars() {
                        let cw = ch.width().unwrap_or(0);
                        if row.width + cw > width {
                            row.flush_into(&mut out);
                        }
                        row.push(ch.encode_utf8(&mut [0; 4]), span.style, cw);
                    }
                }
            }
        }
        row.flush_into(&mut out);
    }
    out
}

#[derive(Default)]
struct Row {
    spans: Vec<Span<'static>>,
    width: usize,
}

impl Row {
    fn push(&mut self, text: &str, style: Style, width: usize) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.spans.push(Span::styled(text.to_string(), style)),
        }
        self.width += width;
    }

    /// Close the row, dropping trailing whitespace.
    fn flush_into(&mut self, out: &mut Vec<Line<'static>>) {
        while let Some(last) = self.spans.last_mut() {
            let kept = last.content.trim_end().len();
            if kept > 0 {
                last.content.to_mut().truncate(kept);
                break;
            }
            self.spans.pop();
        }
        if !self.spans.is_empty() {
            out.push(Line::from(std::mem::take(&mut self.spans)));
        }
        self.width = 0;
    }
}

/// Alternating runs of whitespace and non-whitespace.
fn pieces(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let blank = first.is_whitespace();
        let end = rest
            .find(|c: char| c.is_whitespace() != blank)
            .unwrap_or(rest.len());
        let (piece, tail) = rest.split_at(end);
        rest = tail;
        Some(piece)
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
