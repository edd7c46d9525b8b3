//! Overlays drawn above the active view: the document viewer, the edit
//! form and confirmation/message dialogs.

use agent_core::formatting::{format_created_at, join_tags, parse_tags};
use agent_core::models::{DocKind, DocStatus, KbDocument, KbDocumentUpdate};
use agent_runtime::orchestrator::Request;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::components::badges::{ai_marker, StatusBadge, TagChips};
use crate::components::rich_text::content_lines;
use crate::components::text_input::TextInput;
use crate::themes::Theme;

pub const CONNECTION_ERROR: &str =
    "Could not connect to the backend. Please check your internet connection and try again.";
pub const SAVE_ERROR: &str = "Error saving document";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Modal {
    Document(DocumentModal),
    Edit(EditModal),
    Dialog(Dialog),
}

/// What the app should do after a modal consumed a key.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalAction {
    None,
    Close,
    /// Replace the modal with the edit form for this document.
    Edit(String),
    /// Close the modal and send the request.
    Submit(Request),
    /// Keep the modal open (now busy) and send the request.
    Send(Request),
}

/// Mutation waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Verify { id: String },
    Delete { id: String },
}

impl PendingAction {
    fn request(&self) -> Request {
        match self {
            PendingAction::Verify { id } => Request::Verify { id: id.clone() },
            PendingAction::Delete { id } => Request::Delete { id: id.clone() },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Success,
    Danger,
    Info,
}

// ── Dialog ────────────────────────────────────────────────────────────────────

/// A confirm dialog when `action` is set, otherwise a single-button message.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub kind: DialogKind,
    pub action: Option<PendingAction>,
    /// `true` while the confirm button (rather than Cancel) is selected.
    pub confirm_selected: bool,
}

impl Dialog {
    pub fn message(title: impl Into<String>, message: impl Into<String>, kind: DialogKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            action: None,
            confirm_selected: true,
        }
    }

    pub fn connection_error() -> Self {
        Self::message("Connection Error", CONNECTION_ERROR, DialogKind::Danger)
    }

    pub fn confirm_delete(id: impl Into<String>) -> Self {
        Self {
            title: "Delete Document".into(),
            message: "Are you sure you want to delete this document? This action cannot be undone."
                .into(),
            kind: DialogKind::Danger,
            action: Some(PendingAction::Delete { id: id.into() }),
            confirm_selected: false,
        }
    }

    pub fn confirm_verify(id: impl Into<String>) -> Self {
        Self {
            title: "Verify Document".into(),
            message: "Mark this document as verified? This will indicate that the content has been reviewed and approved.".into(),
            kind: DialogKind::Success,
            action: Some(PendingAction::Verify { id: id.into() }),
            confirm_selected: true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        let Some(action) = &self.action else {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q') => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            };
        };

        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.confirm_selected = !self.confirm_selected;
                ModalAction::None
            }
            KeyCode::Char('y') => ModalAction::Submit(action.request()),
            KeyCode::Char('n') | KeyCode::Esc => ModalAction::Close,
            KeyCode::Enter if self.confirm_selected => ModalAction::Submit(action.request()),
            KeyCode::Enter => ModalAction::Close,
            _ => ModalAction::None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = centered(area, 60, 9);
        let accent = match self.kind {
            DialogKind::Success => theme.success,
            DialogKind::Danger => theme.danger,
            DialogKind::Info => theme.info,
        };

        let buttons = if self.action.is_some() {
            let (cancel, confirm) = if self.confirm_selected {
                (theme.dim, theme.selection.patch(accent))
            } else {
                (theme.selection, theme.dim)
            };
            Line::from(vec![
                Span::styled(" Cancel ", cancel),
                Span::raw("   "),
                Span::styled(" Confirm ", confirm),
            ])
        } else {
            Line::from(Span::styled(" Close ", theme.selection))
        };

        let text = Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(self.message.clone(), theme.text)),
            Line::from(""),
            buttons.centered(),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(accent)
            .title(Span::styled(format!(" {} ", self.title), accent));

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

// ── Document viewer ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct DocumentModal {
    pub id: String,
    pub doc: Option<KbDocument>,
    pub error: Option<String>,
    pub scroll: u16,
}

impl DocumentModal {
    pub fn loading(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc: None,
            error: None,
            scroll: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => ModalAction::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                ModalAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                ModalAction::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                ModalAction::None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                ModalAction::None
            }
            KeyCode::Char('e') if self.doc.is_some() => ModalAction::Edit(self.id.clone()),
            _ => ModalAction::None,
        }
    }

    fn body(&self, theme: &Theme) -> Vec<Line<'static>> {
        if let Some(err) = &self.error {
            return vec![
                Line::from(Span::styled("Error loading document", theme.error)),
                Line::from(Span::styled(err.clone(), theme.error)),
            ];
        }
        let Some(doc) = &self.doc else {
            return vec![Line::from(Span::styled("Loading...", theme.dim))];
        };

        let mut lines = vec![Line::from(Span::styled(doc.title.clone(), theme.header))];
        if let Some(summary) = doc.summary.as_deref().filter(|s| !s.is_empty()) {
            lines.push(Line::from(Span::styled(summary.to_string(), theme.dim)));
        }
        lines.push(Line::from(""));

        let mut meta = vec![
            StatusBadge::new(doc.status, theme).to_span(),
            Span::styled(format!("   {}", doc.kind), theme.label),
        ];
        if let Some(created) = &doc.created_at {
            meta.push(Span::styled(
                format!("   {}", format_created_at(created)),
                theme.dim,
            ));
        }
        if doc.ai_created {
            meta.push(Span::raw("   "));
            meta.push(ai_marker(theme));
        }
        lines.push(Line::from(meta));

        if !doc.tags.is_empty() {
            lines.push(Line::from(owned(TagChips::new(&doc.tags, theme).to_spans())));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Content", theme.label)));

        if doc.content.is_empty() {
            lines.push(Line::from(Span::styled("No content available", theme.dim)));
        } else {
            lines.extend(content_lines(&doc.content, false, theme));
        }
        lines
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = centered(area, 85, area.height.saturating_sub(2));
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_focus)
            .title(Span::styled(
                format!(" Knowledge Base Document  ID: {} ", self.id),
                theme.label,
            ))
            .title_bottom(Span::styled(
                " [Esc] close  [↑↓] scroll  [e] edit ",
                theme.dim,
            ));

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(self.body(theme))
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            area,
        );
    }
}

// ── Edit form ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Summary,
    Content,
    Tags,
    Kind,
    Status,
}

impl EditField {
    const ORDER: [EditField; 6] = [
        EditField::Title,
        EditField::Summary,
        EditField::Content,
        EditField::Tags,
        EditField::Kind,
        EditField::Status,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn multiline(self) -> bool {
        matches!(self, EditField::Summary | EditField::Content)
    }
}

#[derive(Debug)]
pub struct EditForm {
    pub title: TextInput,
    pub summary: TextInput,
    pub content: TextInput,
    pub tags: TextInput,
    pub kind: DocKind,
    pub status: DocStatus,
    /// Carried through unchanged.
    pub ai_created: bool,
    pub focus: EditField,
    pub preview: bool,
}

impl EditForm {
    pub fn from_document(doc: &KbDocument) -> Self {
        Self {
            title: TextInput::with_text(doc.title.clone()),
            summary: TextInput::with_text(doc.summary.clone().unwrap_or_default()),
            content: TextInput::with_text(doc.content.clone()),
            tags: TextInput::with_text(join_tags(&doc.tags)),
            kind: doc.kind,
            status: doc.status,
            ai_created: doc.ai_created,
            focus: EditField::Title,
            preview: false,
        }
    }

    /// Full replacement body for `PUT /api/kb/{id}`.
    pub fn to_update(&self) -> KbDocumentUpdate {
        KbDocumentUpdate {
            title: Some(self.title.text().to_string()),
            content: Some(self.content.text().to_string()),
            summary: Some(self.summary.text().to_string()),
            tags: Some(parse_tags(self.tags.text())),
            kind: Some(self.kind),
            status: Some(self.status),
            ai_created: Some(self.ai_created),
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            EditField::Title => Some(&mut self.title),
            EditField::Summary => Some(&mut self.summary),
            EditField::Content if !self.preview => Some(&mut self.content),
            EditField::Tags => Some(&mut self.tags),
            _ => None,
        }
    }

    /// Apply a field-level key. Returns `false` when the key was not used.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.preview = !self.preview;
            }
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                if self.focus == EditField::Kind =>
            {
                self.kind = self.kind.toggled();
            }
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                if self.focus == EditField::Status =>
            {
                self.status = self.status.toggled();
            }
            KeyCode::Enter if self.focus.multiline() => match self.focused_input() {
                Some(input) => input.insert_char('\n'),
                None => return false,
            },
            KeyCode::Enter => self.focus = self.focus.next(),
            _ => {
                return match self.focused_input() {
                    Some(input) => input.handle_key(key),
                    None => false,
                }
            }
        }
        true
    }

    pub fn paste(&mut self, text: &str) {
        if let Some(input) = self.focused_input() {
            input.insert_str(text);
        }
    }
}

#[derive(Debug)]
pub struct EditModal {
    pub id: String,
    /// `None` while the document is loading.
    pub form: Option<EditForm>,
    pub saving: bool,
    pub error: Option<String>,
}

impl EditModal {
    pub fn loading(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            form: None,
            saving: false,
            error: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        if key.code == KeyCode::Esc {
            return ModalAction::Close;
        }
        if self.saving {
            return ModalAction::None;
        }
        let Some(form) = &mut self.form else {
            return ModalAction::None;
        };

        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.saving = true;
            self.error = None;
            return ModalAction::Send(Request::SaveDocument {
                id: self.id.clone(),
                update: form.to_update(),
            });
        }
        form.handle_key(key);
        ModalAction::None
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = centered(area, 90, area.height.saturating_sub(2));
        let footer = if self.saving {
            " Saving... "
        } else {
            " [Ctrl+S] Save Changes  [Ctrl+P] Preview  [Tab] next field  [Esc] cancel "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_focus)
            .title(Span::styled(" Edit Document ", theme.label))
            .title_bottom(Span::styled(footer, theme.dim));
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let Some(form) = &self.form else {
            let text = self.error.as_deref().unwrap_or("Loading...");
            frame.render_widget(Paragraph::new(Span::styled(text, theme.dim)), inner);
            return;
        };

        let [title_area, summary_area, content_area, tags_area, choice_area, error_area] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(inner);

        let focus = |f: EditField| form.focus == f && !self.saving;
        form.title
            .render(frame, title_area, "Title", "", focus(EditField::Title), theme);
        form.summary
            .render(frame, summary_area, "Summary", "", focus(EditField::Summary), theme);

        if form.preview {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme.frame_style(focus(EditField::Content)))
                .title(Span::styled(" Content (preview) ", theme.label));
            frame.render_widget(
                Paragraph::new(content_lines(form.content.text(), false, theme))
                    .block(block)
                    .wrap(Wrap { trim: false }),
                content_area,
            );
        } else {
            form.content.render(
                frame,
                content_area,
                "Content",
                "",
                focus(EditField::Content),
                theme,
            );
        }

        form.tags.render(
            frame,
            tags_area,
            "Tags (comma separated)",
            "flexsearch, product, query",
            focus(EditField::Tags),
            theme,
        );

        let choice = |label: &'static str, value: String, on: bool| {
            let style = if on { theme.selection } else { theme.value };
            [
                Span::styled(label, theme.label),
                Span::styled(format!(" ‹ {value} › "), style),
                Span::raw("   "),
            ]
        };
        let mut spans = Vec::new();
        spans.extend(choice(" Type:", form.kind.to_string(), focus(EditField::Kind)));
        spans.extend(choice("Status:", form.status.to_string(), focus(EditField::Status)));
        frame.render_widget(Paragraph::new(Line::from(spans)), choice_area);

        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {err}"), theme.error)),
                error_area,
            );
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

impl Modal {
    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        match self {
            Modal::Document(m) => m.handle_key(key),
            Modal::Edit(m) => m.handle_key(key),
            Modal::Dialog(d) => d.handle_key(key),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let Modal::Edit(EditModal {
            form: Some(form),
            saving: false,
            ..
        }) = self
        {
            form.paste(text);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self {
            Modal::Document(m) => m.render(frame, area, theme),
            Modal::Edit(m) => m.render(frame, area, theme),
            Modal::Dialog(d) => d.render(frame, area, theme),
        }
    }
}

/// A rect `percent_x` wide and `height` rows tall, centred in `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    rect
}

fn owned(spans: Vec<Span<'_>>) -> Vec<Span<'static>> {
    spans
        .into_iter()
        .map(|s| Span::styled(s.content.into_owned(), s.style))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn document() -> KbDocument {
        KbDocument {
            id: "doc-1".into(),
            title: "Price rows".into(),
            content: "INSERT_UPDATE PriceRow;price\n;1".into(),
            tags: vec!["impex".into(), "price".into()],
            kind: DocKind::Code,
            status: DocStatus::Unverified,
            summary: Some("Updates prices".into()),
            ai_created: true,
            created_at: Some("2026-01-05T10:00:00".into()),
            metadata: None,
        }
    }

    fn draw(modal: &Modal) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                modal.render(frame, area, &theme);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_message_dialog_closes_on_enter() {
        let mut dialog = Dialog::connection_error();
        assert_eq!(dialog.handle_key(key(KeyCode::Left)), ModalAction::None);
        assert_eq!(dialog.handle_key(key(KeyCode::Enter)), ModalAction::Close);
    }

    #[test]
    fn test_delete_dialog_defaults_to_cancel() {
        let mut dialog = Dialog::confirm_delete("d1");
        assert_eq!(dialog.handle_key(key(KeyCode::Enter)), ModalAction::Close);

        let mut dialog = Dialog::confirm_delete("d1");
        dialog.handle_key(key(KeyCode::Right));
        assert_eq!(
            dialog.handle_key(key(KeyCode::Enter)),
            ModalAction::Submit(Request::Delete { id: "d1".into() })
        );
    }

    #[test]
    fn test_verify_dialog_confirms_with_y() {
        let mut dialog = Dialog::confirm_verify("d2");
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char('y'))),
            ModalAction::Submit(Request::Verify { id: "d2".into() })
        );
        assert_eq!(dialog.handle_key(key(KeyCode::Esc)), ModalAction::Close);
    }

    #[test]
    fn test_edit_form_round_trips_document_fields() {
        let form = EditForm::from_document(&document());
        assert_eq!(form.tags.text(), "impex, price");

        let update = form.to_update();
        assert_eq!(update.title.as_deref(), Some("Price rows"));
        assert_eq!(update.summary.as_deref(), Some("Updates prices"));
        assert_eq!(update.tags, Some(vec!["impex".to_string(), "price".to_string()]));
        assert_eq!(update.kind, Some(DocKind::Code));
        assert_eq!(update.status, Some(DocStatus::Unverified));
        assert_eq!(update.ai_created, Some(true));
    }

    #[test]
    fn test_edit_form_field_navigation_and_toggles() {
        let mut form = EditForm::from_document(&document());
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focus, EditField::Status);
        form.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(form.status, DocStatus::Verified);

        form.handle_key(key(KeyCode::BackTab));
        form.handle_key(key(KeyCode::Right));
        assert_eq!(form.kind, DocKind::Text);

        form.handle_key(key(KeyCode::Tab));
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focus, EditField::Title);
    }

    #[test]
    fn test_edit_form_enter_in_content_inserts_newline() {
        let mut form = EditForm::from_document(&document());
        form.focus = EditField::Content;
        form.content.clear();
        form.handle_key(key(KeyCode::Char('a')));
        form.handle_key(key(KeyCode::Enter));
        form.handle_key(key(KeyCode::Char('b')));
        assert_eq!(form.content.text(), "a\nb");

        form.focus = EditField::Title;
        form.handle_key(key(KeyCode::Enter));
        assert_eq!(form.focus, EditField::Summary);
    }

    #[test]
    fn test_preview_blocks_content_edits() {
        let mut form = EditForm::from_document(&document());
        form.focus = EditField::Content;
        form.handle_key(ctrl('p'));
        assert!(form.preview);
        assert!(!form.handle_key(key(KeyCode::Char('x'))));
        assert!(!form.content.text().contains('x'));
    }

    #[test]
    fn test_edit_modal_save_sends_full_update() {
        let mut modal = EditModal::loading("doc-1");
        assert_eq!(modal.handle_key(ctrl('s')), ModalAction::None);

        modal.form = Some(EditForm::from_document(&document()));
        match modal.handle_key(ctrl('s')) {
            ModalAction::Send(Request::SaveDocument { id, update }) => {
                assert_eq!(id, "doc-1");
                assert_eq!(update.title.as_deref(), Some("Price rows"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(modal.saving);
        // A second save while busy is ignored.
        assert_eq!(modal.handle_key(ctrl('s')), ModalAction::None);
    }

    #[test]
    fn test_document_modal_keys() {
        let mut modal = DocumentModal::loading("doc-1");
        assert_eq!(modal.handle_key(key(KeyCode::Char('e'))), ModalAction::None);
        modal.doc = Some(document());
        assert_eq!(
            modal.handle_key(key(KeyCode::Char('e'))),
            ModalAction::Edit("doc-1".into())
        );
        modal.handle_key(key(KeyCode::Down));
        modal.handle_key(key(KeyCode::Down));
        modal.handle_key(key(KeyCode::Up));
        assert_eq!(modal.scroll, 1);
        assert_eq!(modal.handle_key(key(KeyCode::Esc)), ModalAction::Close);
    }

    #[test]
    fn test_render_document_modal() {
        let mut modal = DocumentModal::loading("doc-1");
        modal.doc = Some(document());
        let rendered = draw(&Modal::Document(modal));
        assert!(rendered.contains("Price rows"));
        assert!(rendered.contains("UNVERIFIED"));
        assert!(rendered.contains("#impex"));
    }

    #[test]
    fn test_render_document_error() {
        let mut modal = DocumentModal::loading("gone");
        modal.error = Some("Document not found".into());
        let rendered = draw(&Modal::Document(modal));
        assert!(rendered.contains("Error loading document"));
    }

    #[test]
    fn test_render_edit_modal_and_dialog() {
        let mut modal = EditModal::loading("doc-1");
        modal.form = Some(EditForm::from_document(&document()));
        let rendered = draw(&Modal::Edit(modal));
        assert!(rendered.contains("Edit Document"));
        assert!(rendered.contains("Tags (comma separated)"));

        let rendered = draw(&Modal::Dialog(Dialog::confirm_delete("d1")));
        assert!(rendered.contains("Delete Document"));
        assert!(rendered.contains("Confirm"));
    }
}
