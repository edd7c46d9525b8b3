//! Chat session identity and idle-timeout rotation.
//!
//! The backend keys conversation memory by a client-generated session id.
//! The id and the time of the last chat activity are persisted to
//! `~/.kb-agent/session.json`; on startup the id is reused unless the idle
//! window has elapsed, in which case a fresh id replaces it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default idle window after which a session is replaced (5 minutes).
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(5 * 60);

// ── SessionState ──────────────────────────────────────────────────────────────

/// Persisted session identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Epoch milliseconds of the last chat activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_ms: Option<i64>,
}

impl SessionState {
    /// Return the default path of the session file.
    pub fn state_path() -> PathBuf {
        Self::state_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the session file path rooted at `base_dir` (used for testing).
    pub fn state_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".kb-agent").join("session.json")
    }

    /// Load state from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write state to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the state file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Record activity at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active_ms = Some(now.timestamp_millis());
    }
}

// ── Rotation ──────────────────────────────────────────────────────────────────

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResolution {
    /// Id to use for chat requests from now on.
    pub session_id: String,
    /// Previous id that went idle and should be discarded server-side.
    pub expired: Option<String>,
    /// `true` when `session_id` was freshly generated; the transcript must be
    /// cleared.
    pub rotated: bool,
}

/// Milliseconds elapsed between `last_active_ms` and `now`.
///
/// A timestamp in the future counts as zero elapsed time.
pub fn idle_millis(last_active_ms: i64, now: DateTime<Utc>) -> u64 {
    let elapsed = now.timestamp_millis().saturating_sub(last_active_ms);
    u64::try_from(elapsed).unwrap_or(0)
}

/// Decide whether the stored session is reused or replaced, and update
/// `state` in place (new id when rotated, last-active set to `now`).
pub fn resolve(
    state: &mut SessionState,
    now: DateTime<Utc>,
    max_idle: Duration,
) -> SessionResolution {
    let max_idle_ms = u64::try_from(max_idle.as_millis()).unwrap_or(u64::MAX);
    let idle_expired = state
        .last_active_ms
        .map(|last| idle_millis(last, now) > max_idle_ms)
        .unwrap_or(false);

    let resolution = match state.session_id.take() {
        Some(id) if !idle_expired => SessionResolution {
            session_id: id,
            expired: None,
            rotated: false,
        },
        previous => {
            if let Some(ref old) = previous {
                tracing::info!(session = %old, "chat session idle for too long; rotating");
            }
            SessionResolution {
                session_id: new_session_id(),
                expired: previous,
                rotated: true,
            }
        }
    };

    state.session_id = Some(resolution.session_id.clone());
    state.touch(now);
    resolution
}

/// Generate a fresh random session id.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
