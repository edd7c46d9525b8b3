//! Main application state and TUI event loop.
//!
//! [`App`] owns the theme, the active view, every view's state and the open
//! modal. Key presses become [`Request`]s for the orchestrator; its
//! [`RuntimeEvent`]s flow back in through [`App::handle_runtime_event`].

use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;

use agent_core::models::{DocKind, DocStatus};
use agent_core::AgentError;
use agent_runtime::chat::ChatUpdate;
use agent_runtime::orchestrator::{OrchestratorHandle, Request, RuntimeEvent};
use agent_runtime::session_manager::SessionManager;

use crate::chat_view::{self, ChatState, MAX_SOURCE_KEYS};
use crate::components::header::Header;
use crate::extractor_view::{self, ExtractorNotice, ExtractorState};
use crate::kb_view::{self, KbFocus, KbState};
use crate::modal::{
    Dialog, DialogKind, DocumentModal, EditForm, EditModal, Modal, ModalAction, SAVE_ERROR,
};
use crate::themes::Theme;

/// Rows scrolled per PageUp/PageDown in the transcript.
const PAGE: usize = 5;

// ── View ──────────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chat,
    KnowledgeBase,
    Extractor,
}

impl View {
    pub const ALL: [View; 3] = [View::Chat, View::KnowledgeBase, View::Extractor];

    /// Parse a `--view` value; anything unknown falls back to chat.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "kb" | "knowledge-base" => View::KnowledgeBase,
            "extract" | "extractor" => View::Extractor,
            _ => View::Chat,
        }
    }

    /// The `--view` spelling.
    pub fn name(&self) -> &'static str {
        match self {
            View::Chat => "chat",
            View::KnowledgeBase => "kb",
            View::Extractor => "extract",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Chat => "Chat",
            View::KnowledgeBase => "Knowledge Base",
            View::Extractor => "Extractor",
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Chat => View::KnowledgeBase,
            View::KnowledgeBase => View::Extractor,
            View::Extractor => View::Chat,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub view: View,
    pub api_url: String,
    pub session_id: String,
    pub should_quit: bool,
    pub chat: ChatState,
    pub kb: KbState,
    pub extractor: ExtractorState,
    pub modal: Option<Modal>,
    /// One-line notice shown in the footer.
    pub status: Option<String>,
    session: Option<SessionManager>,
}

impl App {
    pub fn new(theme_name: &str, view: View, api_url: String, session_id: String) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view,
            api_url,
            session_id,
            should_quit: false,
            chat: ChatState::new(),
            kb: KbState::new(),
            extractor: ExtractorState::new(),
            modal: None,
            status: None,
            session: None,
        }
    }

    /// Persist chat activity through `manager`.
    pub fn with_session(mut self, manager: SessionManager) -> Self {
        self.session = Some(manager);
        self
    }

    /// Requests to send before the first frame.
    pub fn startup_requests(&mut self) -> Vec<Request> {
        self.enter_view(self.view)
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the TUI until the user quits or the runtime channel closes.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<RuntimeEvent>,
        handle: &OrchestratorHandle,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);
        for request in self.startup_requests() {
            handle.submit(request);
        }

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            let requests = match poll_event(tick_rate) {
                Ok(Some(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    self.handle_key(key)
                }
                Ok(Some(Event::Paste(text))) => {
                    self.handle_paste(&text);
                    Vec::new()
                }
                Ok(_) => Vec::new(),
                Err(e) => break Err(e),
            };
            for request in requests {
                handle.submit(request);
            }

            // Drain any pending runtime results (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(event) => {
                        for request in self.handle_runtime_event(event, Utc::now()) {
                            handle.submit(request);
                        }
                    }
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        tracing::warn!("runtime channel closed");
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Request> {
        // A notice lasts until the next key press.
        self.status = None;

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.should_quit = true;
            return Vec::new();
        }

        if let Some(modal) = &mut self.modal {
            let action = modal.handle_key(key);
            return self.apply_modal_action(action);
        }

        match key.code {
            KeyCode::F(n @ 1..=3) => return self.enter_view(View::ALL[usize::from(n - 1)]),
            KeyCode::Tab => return self.enter_view(self.view.next()),
            _ => {}
        }

        match self.view {
            View::Chat => self.chat_key(key),
            View::KnowledgeBase => self.kb_key(key),
            View::Extractor => self.extractor_key(key),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let Some(modal) = &mut self.modal {
            modal.handle_paste(text);
            return;
        }
        match self.view {
            View::Chat if !self.chat.conversation.is_loading() => self.chat.input.insert_str(text),
            View::KnowledgeBase if self.kb.focus == KbFocus::Search => {
                self.kb.search.insert_str(text);
                self.kb.sync_search();
            }
            View::Extractor if !self.extractor.is_busy() => self.extractor.input.insert_str(text),
            _ => {}
        }
    }

    fn enter_view(&mut self, view: View) -> Vec<Request> {
        self.view = view;
        if view == View::KnowledgeBase && !self.kb.loaded && !self.kb.loading {
            self.kb.loading = true;
            return vec![Request::LoadIndex];
        }
        Vec::new()
    }

    fn chat_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('t') if ctrl => {
                if let Some(idx) = self.chat.focused_thinking() {
                    self.chat.toggle_thinking(idx);
                }
                return Vec::new();
            }
            KeyCode::Up | KeyCode::Down if alt => {
                self.chat.move_thinking_focus(key.code == KeyCode::Up);
                return Vec::new();
            }
            KeyCode::Char(c @ '1'..='9') if alt => {
                let n = c as usize - '1' as usize;
                let sources = self.chat.latest_sources();
                if n < MAX_SOURCE_KEYS {
                    if let Some(id) = sources.get(n) {
                        return self.open_document(id.clone());
                    }
                }
                return Vec::new();
            }
            KeyCode::PageUp => {
                self.chat.scroll_back = self.chat.scroll_back.saturating_add(PAGE);
                return Vec::new();
            }
            KeyCode::PageDown => {
                self.chat.scroll_back = self.chat.scroll_back.saturating_sub(PAGE);
                return Vec::new();
            }
            _ => {}
        }

        if self.chat.conversation.is_loading() {
            return Vec::new();
        }

        match key.code {
            KeyCode::Enter if alt => self.chat.input.insert_char('\n'),
            KeyCode::Enter => return self.send_chat(),
            _ => {
                self.chat.input.handle_key(key);
            }
        }
        Vec::new()
    }

    fn send_chat(&mut self) -> Vec<Request> {
        if self.chat.input.is_blank() {
            return Vec::new();
        }
        let now = Utc::now();
        let mut requests = self.rotate_idle_session(now);

        let text = self.chat.input.take();
        let Some(message) = self.chat.conversation.begin_turn(&text) else {
            return requests;
        };
        self.chat.scroll_back = 0;
        self.chat.thinking_focus = None;
        self.touch_session(now);
        requests.push(Request::SendChat {
            message,
            session_id: self.session_id.clone(),
        });
        requests
    }

    /// Switch to a fresh session when the current one sat idle past the
    /// window; the old id is discarded on the backend.
    fn rotate_idle_session(&mut self, now: DateTime<Utc>) -> Vec<Request> {
        let Some(resolution) = self.session.as_mut().and_then(|s| s.rotate_if_idle(now)) else {
            return Vec::new();
        };
        tracing::info!(session = %resolution.session_id, "session went idle; starting a new one");
        self.session_id = resolution.session_id;
        self.chat.reset();
        resolution
            .expired
            .map(|session_id| Request::DiscardSession { session_id })
            .into_iter()
            .collect()
    }

    fn kb_key(&mut self, key: KeyEvent) -> Vec<Request> {
        match self.kb.focus {
            KbFocus::Search => {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => self.kb.focus = KbFocus::List,
                    _ => {
                        if self.kb.search.handle_key(key) {
                            self.kb.sync_search();
                        }
                    }
                }
                Vec::new()
            }
            KbFocus::Tags => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('t') => self.kb.focus = KbFocus::List,
                    KeyCode::Left | KeyCode::Char('h') => self.kb.tag_cursor_prev(),
                    KeyCode::Right | KeyCode::Char('l') => self.kb.tag_cursor_next(),
                    KeyCode::Char(' ') | KeyCode::Enter => self.kb.toggle_current_tag(),
                    _ => {}
                }
                Vec::new()
            }
            KbFocus::List => self.kb_list_key(key),
        }
    }

    fn kb_list_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let selected = self
            .kb
            .selected_doc()
            .map(|d| (d.id.clone(), d.status));

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.kb.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.kb.select_next(),
            KeyCode::Char('/') => self.kb.focus = KbFocus::Search,
            KeyCode::Char('t') => self.kb.focus = KbFocus::Tags,
            KeyCode::Char('s') => self.kb.cycle_status(),
            KeyCode::Char('o') => self.kb.cycle_origin(),
            KeyCode::Char('x') => self.kb.clear_filters(),
            KeyCode::Char('r') => {
                self.kb.loading = true;
                return vec![Request::LoadIndex];
            }
            KeyCode::Enter => {
                if let Some((id, _)) = selected {
                    return self.open_document(id);
                }
            }
            KeyCode::Char('e') => {
                if let Some((id, _)) = selected {
                    return self.open_editor(id);
                }
            }
            KeyCode::Char('v') => {
                if let Some((id, DocStatus::Unverified)) = selected {
                    self.modal = Some(Modal::Dialog(Dialog::confirm_verify(id)));
                }
            }
            KeyCode::Char('d') => {
                if let Some((id, _)) = selected {
                    self.modal = Some(Modal::Dialog(Dialog::confirm_delete(id)));
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn extractor_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::F(5) => self.analyze(),
            KeyCode::Char('e') if ctrl => self.analyze(),
            KeyCode::F(6) => self.save_extracted(),
            KeyCode::Char('s') if ctrl => self.save_extracted(),
            KeyCode::Enter if !self.extractor.is_busy() => {
                self.extractor.input.insert_char('\n');
                Vec::new()
            }
            _ => {
                if !self.extractor.is_busy() {
                    self.extractor.input.handle_key(key);
                }
                Vec::new()
            }
        }
    }

    fn analyze(&mut self) -> Vec<Request> {
        self.extractor
            .start_analyze()
            .map(|text| Request::Extract { text })
            .into_iter()
            .collect()
    }

    fn save_extracted(&mut self) -> Vec<Request> {
        self.extractor
            .start_save()
            .map(|text| Request::ExtractAndSave {
                text,
                kind: DocKind::Code,
            })
            .into_iter()
            .collect()
    }

    fn open_document(&mut self, id: String) -> Vec<Request> {
        self.modal = Some(Modal::Document(DocumentModal::loading(id.clone())));
        vec![Request::OpenDocument { id }]
    }

    fn open_editor(&mut self, id: String) -> Vec<Request> {
        self.modal = Some(Modal::Edit(EditModal::loading(id.clone())));
        vec![Request::LoadForEdit { id }]
    }

    fn apply_modal_action(&mut self, action: ModalAction) -> Vec<Request> {
        match action {
            ModalAction::None => Vec::new(),
            ModalAction::Close => {
                self.modal = None;
                Vec::new()
            }
            ModalAction::Edit(id) => self.open_editor(id),
            ModalAction::Submit(request) => {
                self.modal = None;
                vec![request]
            }
            ModalAction::Send(request) => vec![request],
        }
    }

    // ── Runtime events ────────────────────────────────────────────────────────

    /// Fold one runtime result into the UI; returns follow-up requests.
    pub fn handle_runtime_event(&mut self, event: RuntimeEvent, now: DateTime<Utc>) -> Vec<Request> {
        match event {
            RuntimeEvent::Chat(update) => {
                match update {
                    ChatUpdate::Event(e) => self.chat.conversation.apply(e),
                    ChatUpdate::Failed(e) => {
                        tracing::warn!(error = %e, "chat turn failed");
                        self.chat.conversation.fail();
                    }
                    ChatUpdate::Finished => self.chat.conversation.finish(),
                }
                self.touch_session(now);
                Vec::new()
            }
            RuntimeEvent::IndexLoaded(Ok(docs)) => {
                tracing::debug!(count = docs.len(), "index loaded");
                self.kb.set_docs(docs);
                Vec::new()
            }
            RuntimeEvent::IndexLoaded(Err(e)) => {
                self.kb.loading = false;
                tracing::warn!(error = %e, "failed to fetch knowledge base");
                if e.is_connection_error() {
                    if self.modal.is_none() {
                        self.modal = Some(Modal::Dialog(Dialog::connection_error()));
                    }
                } else {
                    self.status = Some(e.to_string());
                }
                Vec::new()
            }
            RuntimeEvent::DocumentOpened(result) => {
                if let Some(Modal::Document(modal)) = &mut self.modal {
                    match result {
                        Ok(doc) => modal.doc = Some(doc),
                        Err(e) => modal.error = Some(document_error(&e)),
                    }
                }
                Vec::new()
            }
            RuntimeEvent::EditLoaded(result) => {
                if let Some(Modal::Edit(modal)) = &mut self.modal {
                    match result {
                        Ok(doc) => modal.form = Some(EditForm::from_document(&doc)),
                        Err(e) => modal.error = Some(document_error(&e)),
                    }
                }
                Vec::new()
            }
            RuntimeEvent::DocumentSaved { id, result } => match result {
                Ok(_) => {
                    if matches!(&self.modal, Some(Modal::Edit(m)) if m.id == id) {
                        self.modal = None;
                    }
                    self.status = Some("Document saved".into());
                    self.reload_index()
                }
                Err(e) => {
                    tracing::warn!(error = %e, id = %id, "save failed");
                    if let Some(Modal::Edit(modal)) = &mut self.modal {
                        modal.saving = false;
                        modal.error = Some(SAVE_ERROR.into());
                    }
                    Vec::new()
                }
            },
            RuntimeEvent::Verified { id, result } => {
                self.after_mutation("verify", &id, result.map(|_| ()))
            }
            RuntimeEvent::Deleted { id, result } => {
                self.after_mutation("delete", &id, result.map(|_| ()))
            }
            RuntimeEvent::Extracted(result) => {
                if let Some(notice) = self.extractor.on_extracted(result) {
                    self.show_notice(notice);
                }
                Vec::new()
            }
            RuntimeEvent::ExtractSaved(result) => {
                let notice = self.extractor.on_saved(result);
                let saved = matches!(notice, ExtractorNotice::Saved(_));
                self.show_notice(notice);
                if saved && self.kb.loaded {
                    return self.reload_index();
                }
                Vec::new()
            }
        }
    }

    fn after_mutation(
        &mut self,
        what: &str,
        id: &str,
        result: agent_core::Result<()>,
    ) -> Vec<Request> {
        match result {
            Ok(()) => {
                tracing::info!(id, "{what} succeeded");
                self.reload_index()
            }
            Err(e) => {
                tracing::warn!(error = %e, id, "{what} failed");
                self.status = Some(e.to_string());
                Vec::new()
            }
        }
    }

    fn reload_index(&mut self) -> Vec<Request> {
        self.kb.loading = true;
        vec![Request::LoadIndex]
    }

    fn show_notice(&mut self, notice: ExtractorNotice) {
        let dialog = match notice {
            ExtractorNotice::Saved(text) => Dialog::message("Success!", text, DialogKind::Success),
            ExtractorNotice::Failed(text) => Dialog::message("Error", text, DialogKind::Danger),
        };
        self.modal = Some(Modal::Dialog(dialog));
    }

    fn touch_session(&mut self, now: DateTime<Utc>) {
        if self.chat.conversation.is_empty() {
            return;
        }
        if let Some(session) = &mut self.session {
            session.touch(now);
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let [header_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let header = Header::new(self.view, &self.api_url, &self.session_id, &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        match self.view {
            View::Chat => chat_view::render_chat_view(frame, body_area, &self.chat, &self.theme),
            View::KnowledgeBase => kb_view::render_kb_view(frame, body_area, &self.kb, &self.theme),
            View::Extractor => {
                extractor_view::render_extractor_view(frame, body_area, &self.extractor, &self.theme)
            }
        }

        let footer = match &self.status {
            Some(text) => Line::from(Span::styled(format!(" {text}"), self.theme.info)),
            None => Line::from(vec![
                Span::styled(" Tab/F1-F3 ", self.theme.label),
                Span::styled("switch view   ", self.theme.dim),
                Span::styled("Ctrl+C ", self.theme.label),
                Span::styled("quit", self.theme.dim),
            ]),
        };
        frame.render_widget(Paragraph::new(footer), footer_area);

        if let Some(modal) = &self.modal {
            modal.render(frame, frame.area(), &self.theme);
        }
    }
}

fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

fn document_error(e: &AgentError) -> String {
    match e {
        AgentError::NotFound(_) => "Document not found".to_string(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
