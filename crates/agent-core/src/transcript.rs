//! Chat transcript and the reducer that folds streamed events into it.
//!
//! A turn appends the user's message plus a model placeholder. Stream events
//! then rewrite that placeholder in place: progress messages accumulate as
//! thinking steps, an answer settles it. The in-progress model message is
//! always the last element of [`Conversation::messages`].

use crate::models::StreamEvent;

/// Text shown in place of an answer when a turn fails.
pub const FALLBACK_ANSWER: &str = "Sorry, something went wrong.";

// ── ChatMessage ───────────────────────────────────────────────────────────────

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// `true` while the backend is still working on this answer.
    pub is_thinking: bool,
    /// Progress messages received for this answer, in arrival order.
    pub thinking_steps: Vec<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_thinking: false,
            thinking_steps: Vec::new(),
        }
    }

    /// An empty model message waiting for stream events.
    pub fn placeholder() -> Self {
        Self::thinking(Vec::new())
    }

    fn thinking(steps: Vec<String>) -> Self {
        Self {
            role: Role::Model,
            content: String::new(),
            is_thinking: true,
            thinking_steps: steps,
        }
    }

    fn answered(content: String, steps: Vec<String>) -> Self {
        Self {
            role: Role::Model,
            content,
            is_thinking: false,
            thinking_steps: steps,
        }
    }

    /// `true` for a settled model answer that has steps worth revealing.
    pub fn has_hidden_thinking(&self) -> bool {
        self.role == Role::Model && !self.is_thinking && !self.thinking_steps.is_empty()
    }
}

// ── Conversation ──────────────────────────────────────────────────────────────

/// The running transcript plus the state of the current turn.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    is_loading: bool,
    /// Steps collected for the turn in flight.
    steps: Vec<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// `true` while a turn is streaming.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Start a turn for `input`.
    ///
    /// Returns the message to send, or `None` when the input is blank or a
    /// turn is already in flight.
    pub fn begin_turn(&mut self, input: &str) -> Option<String> {
        if input.trim().is_empty() || self.is_loading {
            return None;
        }

        self.messages.push(ChatMessage::user(input));
        self.messages.push(ChatMessage::placeholder());
        self.steps.clear();
        self.is_loading = true;
        Some(input.to_string())
    }

    /// Fold one stream event into the transcript.
    ///
    /// Events received while no turn is in flight are dropped.
    pub fn apply(&mut self, event: StreamEvent) {
        if !self.is_loading {
            tracing::debug!(?event, "stream event outside of a turn; dropped");
            return;
        }

        match event {
            StreamEvent::Step { content } | StreamEvent::Info { content } => {
                self.steps.push(content);
                self.replace_last(ChatMessage::thinking(self.steps.clone()));
            }
            StreamEvent::Answer { content } => {
                self.replace_last(ChatMessage::answered(content, self.steps.clone()));
            }
            StreamEvent::Error { content } => {
                tracing::warn!(error = %content, "backend reported a chat failure");
                self.replace_last(ChatMessage::answered(
                    FALLBACK_ANSWER.to_string(),
                    self.steps.clone(),
                ));
            }
            StreamEvent::Unknown => {}
        }
    }

    /// The request or the stream failed: swap the placeholder for the
    /// fallback answer.
    pub fn fail(&mut self) {
        if !self.is_loading {
            return;
        }
        self.messages.pop();
        self.messages.push(ChatMessage::answered(
            FALLBACK_ANSWER.to_string(),
            Vec::new(),
        ));
        self.is_loading = false;
        self.steps.clear();
    }

    /// The stream ended.
    pub fn finish(&mut self) {
        if !self.is_loading {
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            if last.is_thinking {
                last.is_thinking = false;
            }
        }
        self.is_loading = false;
        self.steps.clear();
    }

    /// Drop the whole transcript (session rotated).
    pub fn clear(&mut self) {
        self.messages.clear();
        self.steps.clear();
        self.is_loading = false;
    }

    fn replace_last(&mut self, message: ChatMessage) {
        match self.messages.last_mut() {
            Some(last) => *last = message,
            None => self.messages.push(message),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
