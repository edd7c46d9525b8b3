//! Wire types shared by the API client, the runtime and the TUI.
//!
//! Field names follow the backend's JSON (`snake_case`, `type` for the
//! document kind).

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Document enums ────────────────────────────────────────────────────────────

/// Review state of a knowledge-base document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    /// Reviewed and approved by a human.
    #[default]
    Verified,
    /// Not yet reviewed.
    Unverified,
}

impl DocStatus {
    /// The lowercase wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocStatus::Verified => "verified",
            DocStatus::Unverified => "unverified",
        }
    }

    /// The other status (used by form toggles).
    pub fn toggled(self) -> Self {
        match self {
            DocStatus::Verified => DocStatus::Unverified,
            DocStatus::Unverified => DocStatus::Verified,
        }
    }
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of content stored in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    #[default]
    Code,
    Text,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Code => "code",
            DocKind::Text => "text",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DocKind::Code => DocKind::Text,
            DocKind::Text => DocKind::Code,
        }
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Knowledge base ────────────────────────────────────────────────────────────

fn untitled() -> String {
    "Untitled".to_string()
}

/// One row of `GET /api/kb`.
///
/// Missing fields default the way the backend's index builder does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbIndexEntry {
    pub id: String,
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: DocStatus,
    #[serde(default)]
    pub ai_created: bool,
}

/// A full document from `GET /api/kb/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbDocument {
    pub id: String,
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: DocKind,
    #[serde(default = "unverified")]
    pub status: DocStatus,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub ai_created: bool,
    /// ISO-8601 creation time as written by the backend, if recorded.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

fn unverified() -> DocStatus {
    DocStatus::Unverified
}

/// Body of `PUT /api/kb/{id}`; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KbDocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_created: Option<bool>,
}

impl KbDocumentUpdate {
    /// The partial update that marks a document as reviewed.
    pub fn verify() -> Self {
        Self {
            status: Some(DocStatus::Verified),
            ..Default::default()
        }
    }
}

// ── Extractor ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

/// Metadata generated for a piece of text by `POST /api/extract`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractAndSaveRequest {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: DocKind,
}

/// Response of `POST /api/extract/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl SavedDocument {
    /// Confirmation text shown after a successful save.
    pub fn confirmation(&self) -> String {
        format!(
            "Document saved to Knowledge Base!\n\nID: {}\nTitle: {}\nTags: {}",
            self.id,
            self.title,
            self.tags.join(", ")
        )
    }
}

// ── Chat ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// One line of the `POST /api/chat` NDJSON stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Intermediate progress message.
    Step {
        #[serde(default)]
        content: String,
    },
    /// Informational progress message, shown like a step.
    Info {
        #[serde(default)]
        content: String,
    },
    /// Final answer text; may arrive more than once per turn.
    Answer {
        #[serde(default)]
        content: String,
    },
    /// Backend-side failure while generating.
    Error {
        #[serde(default)]
        content: String,
    },
    /// Any discriminator this client does not know.
    #[serde(other)]
    Unknown,
}

/// Generic `{status?, message?}` acknowledgement body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
