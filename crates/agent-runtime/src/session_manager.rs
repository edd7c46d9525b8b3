//! Persisted chat session lifecycle.
//!
//! Wraps [`agent_core::session`] with file persistence and the best-effort
//! server-side cleanup of an expired session.

use std::path::PathBuf;
use std::time::Duration;

use agent_core::session::{self, SessionResolution, SessionState};
use agent_data::ApiClient;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

// ── SessionManager ────────────────────────────────────────────────────────────

/// Owns the session file and the current session id.
#[derive(Debug)]
pub struct SessionManager {
    path: PathBuf,
    max_idle: Duration,
    state: SessionState,
}

impl SessionManager {
    /// Load the state stored at `path`. A missing or corrupt file starts empty.
    pub fn new(path: PathBuf, max_idle: Duration) -> Self {
        let state = SessionState::load_from(&path);
        Self {
            path,
            max_idle,
            state,
        }
    }

    /// Resolve the session for a new run of the client and persist the
    /// result.
    ///
    /// When the returned resolution has `rotated == true` the caller must
    /// start from an empty transcript.
    pub fn initialize(&mut self, now: DateTime<Utc>) -> SessionResolution {
        let resolution = session::resolve(&mut self.state, now, self.max_idle);
        self.persist();
        tracing::debug!(
            session = %resolution.session_id,
            rotated = resolution.rotated,
            "chat session resolved"
        );
        resolution
    }

    /// Re-check the idle window before new chat activity in a long-running
    /// client. Returns the resolution only when the session was rotated.
    pub fn rotate_if_idle(&mut self, now: DateTime<Utc>) -> Option<SessionResolution> {
        let resolution = self.initialize(now);
        resolution.rotated.then_some(resolution)
    }

    /// Current session id, `None` before [`initialize`](Self::initialize).
    pub fn session_id(&self) -> Option<&str> {
        self.state.session_id.as_deref()
    }

    pub fn last_active_ms(&self) -> Option<i64> {
        self.state.last_active_ms
    }

    /// Record chat activity at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.state.touch(now);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.state.save_to(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save session state");
        }
    }
}

// ── Server-side cleanup ───────────────────────────────────────────────────────

/// Ask the backend to forget `session_id` in the background.
///
/// Failures are logged and otherwise ignored.
pub fn discard_remote(client: ApiClient, session_id: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        match client.clear_session(&session_id).await {
            Ok(_) => tracing::debug!(session = %session_id, "expired session cleared on backend"),
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "failed to clear old session")
            }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
