//! Knowledge-base browser: filters, tag facets and document cards.

use std::ops::Range;

use agent_core::filters::{tag_facets, KbFilter};
use agent_core::formatting::truncate_chars;
use agent_core::models::KbIndexEntry;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::components::badges::{ai_marker, StatusBadge, TagChips};
use crate::components::text_input::TextInput;
use crate::themes::Theme;

/// Summary characters shown on a card.
const SUMMARY_CHARS: usize = 160;

/// Which part of the browser receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KbFocus {
    #[default]
    List,
    Search,
    Tags,
}

// ── KbState ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct KbState {
    docs: Vec<KbIndexEntry>,
    tags: Vec<String>,
    pub filter: KbFilter,
    pub search: TextInput,
    pub focus: KbFocus,
    /// Position in the filtered list.
    pub selected: usize,
    /// Position in the tag facet row.
    pub tag_cursor: usize,
    pub loading: bool,
    /// `true` once an index fetch has succeeded.
    pub loaded: bool,
}

impl KbState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index and recompute the tag facets.
    pub fn set_docs(&mut self, docs: Vec<KbIndexEntry>) {
        self.tags = tag_facets(&docs);
        self.docs = docs;
        self.loading = false;
        self.loaded = true;
        self.tag_cursor = self.tag_cursor.min(self.tags.len().saturating_sub(1));
        self.clamp_selection();
    }

    pub fn docs(&self) -> &[KbIndexEntry] {
        &self.docs
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn visible(&self) -> Vec<&KbIndexEntry> {
        self.filter.apply(&self.docs)
    }

    pub fn selected_doc(&self) -> Option<&KbIndexEntry> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let count = self.visible().len();
        if self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Copy the search box into the filter.
    pub fn sync_search(&mut self) {
        self.filter.search = self.search.text().to_string();
        self.selected = 0;
    }

    pub fn cycle_status(&mut self) {
        self.filter.status = self.filter.status.next();
        self.clamp_selection();
    }

    pub fn cycle_origin(&mut self) {
        self.filter.origin = self.filter.origin.next();
        self.clamp_selection();
    }

    /// Toggle the tag under the facet cursor.
    pub fn toggle_current_tag(&mut self) {
        if let Some(tag) = self.tags.get(self.tag_cursor).cloned() {
            self.filter.toggle_tag(&tag);
            self.clamp_selection();
        }
    }

    pub fn tag_cursor_next(&mut self) {
        if self.tag_cursor + 1 < self.tags.len() {
            self.tag_cursor += 1;
        }
    }

    pub fn tag_cursor_prev(&mut self) {
        self.tag_cursor = self.tag_cursor.saturating_sub(1);
    }

    pub fn clear_filters(&mut self) {
        self.filter = KbFilter::default();
        self.search.clear();
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        let count = self.visible().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Render the knowledge-base view into `area`.
pub fn render_kb_view(frame: &mut Frame, area: Rect, state: &KbState, theme: &Theme) {
    let [search_area, filter_area, tags_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(3),
    ])
    .areas(area);

    state.search.render(
        frame,
        search_area,
        "Search (/)",
        "Search...",
        state.focus == KbFocus::Search,
        theme,
    );
    frame.render_widget(Paragraph::new(filter_line(state, theme)), filter_area);
    render_tag_facets(frame, tags_area, state, theme);
    render_cards(frame, list_area, state, theme);
}

fn filter_line(state: &KbState, theme: &Theme) -> Line<'static> {
    let shown = state.visible().len();
    Line::from(vec![
        Span::styled(" [s] ", theme.dim),
        Span::styled(state.filter.status.label(), theme.value),
        Span::styled("   [o] ", theme.dim),
        Span::styled(state.filter.origin.label(), theme.value),
        Span::styled(
            format!("   {shown} of {} documents", state.docs.len()),
            theme.label,
        ),
    ])
}

fn render_tag_facets(frame: &mut Frame, area: Rect, state: &KbState, theme: &Theme) {
    let focused = state.focus == KbFocus::Tags;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.frame_style(focused))
        .title(Span::styled(" Tags (t) ", theme.label));
    let inner_width = usize::from(block.inner(area).width);

    let chips: Vec<String> = state.tags.iter().map(|tag| format!(" {tag} ")).collect();
    let widths: Vec<usize> = chips.iter().map(|c| c.width() + 1).collect();
    let window = facet_window(&widths, state.tag_cursor, inner_width);

    let mut spans = Vec::new();
    if window.start > 0 {
        spans.push(Span::styled("‹ ", theme.dim));
    }
    for i in window.clone() {
        let selected = state.filter.tags.contains(&state.tags[i]);
        let mut style = if selected {
            theme.tag_selected
        } else {
            theme.tag
        };
        if focused && i == state.tag_cursor {
            style = style.patch(theme.selection);
        }
        spans.push(Span::styled(chips[i].clone(), style));
        spans.push(Span::raw(" "));
    }
    if window.end < chips.len() {
        spans.push(Span::styled("›", theme.dim));
    }
    if chips.is_empty() {
        spans.push(Span::styled("No tags", theme.dim));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Range of chips (given their widths) to draw in `width` columns so that
/// the chip at `cursor` is visible. Two columns per side are kept for the
/// scroll markers once not everything fits.
pub fn facet_window(widths: &[usize], cursor: usize, width: usize) -> Range<usize> {
    if widths.iter().sum::<usize>() <= width {
        return 0..widths.len();
    }
    let width = width.saturating_sub(4);
    let cursor = cursor.min(widths.len().saturating_sub(1));

    let mut start = 0;
    let mut used: usize = widths[..=cursor].iter().sum();
    while used > width && start < cursor {
        used -= widths[start];
        start += 1;
    }
    let mut end = cursor + 1;
    while end < widths.len() && used + widths[end] <= width {
        used += widths[end];
        end += 1;
    }
    start..end
}

/// Three-line card for one index entry.
pub fn card_item(doc: &KbIndexEntry, theme: &Theme) -> ListItem<'static> {
    let mut head = vec![
        StatusBadge::new(doc.status, theme).to_span(),
        Span::raw("  "),
        Span::styled(doc.title.clone(), theme.bold),
    ];
    if doc.ai_created {
        head.push(Span::raw("  "));
        head.push(ai_marker(theme));
    }

    let mut lines = vec![Line::from(head)];
    if !doc.summary.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate_chars(&doc.summary, SUMMARY_CHARS)),
            theme.dim,
        )));
    }
    let mut tags = vec![Span::raw("  ")];
    tags.extend(
        TagChips::card(&doc.tags, theme)
            .to_spans()
            .into_iter()
            .map(|s| Span::styled(s.content.into_owned(), s.style)),
    );
    lines.push(Line::from(tags));

    ListItem::new(Text::from(lines))
}

fn render_cards(frame: &mut Frame, area: Rect, state: &KbState, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.frame_style(state.focus == KbFocus::List))
        .title(Span::styled(
            " Documents  [Enter] open  [e] edit  [v] verify  [d] delete  [r] refresh ",
            theme.label,
        ));

    let visible = state.visible();
    if visible.is_empty() {
        let message = if state.loading {
            "Loading knowledge base..."
        } else if state.docs.is_empty() {
            "The knowledge base is empty."
        } else {
            "No documents match the current filters. Press x to clear them."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, theme.dim)).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|doc| card_item(doc, theme)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selection)
        .highlight_symbol("▌");
    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

// ── Tests ────────────────────────────────────────────────────────────────────
