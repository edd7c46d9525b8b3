//! HTTP client for the knowledge-base backend.
//!
//! Each method maps to one endpoint of the backend's `/api` surface. Any
//! non-success status becomes [`AgentError::Status`] tagged with the
//! operation name; connection-level failures become
//! [`AgentError::Transport`].

use std::time::Duration;

use agent_core::error::{AgentError, Result};
use agent_core::models::{
    ApiAck, ChatRequest, DocKind, ExtractAndSaveRequest, ExtractRequest, ExtractedMetadata,
    KbDocument, KbDocumentUpdate, KbIndexEntry, SavedDocument,
};
use futures_util::StreamExt;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::stream::{ChatStream, EventStream};

/// Thin typed wrapper around [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    /// Applied to every request except the chat stream.
    request_timeout: Duration,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AgentError::Config(format!("invalid API URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AgentError::Config(format!(
                "API URL {base_url:?} cannot carry a path"
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base,
            http,
            request_timeout,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    // ── Session ───────────────────────────────────────────────────────────

    /// Ask the backend to drop the conversation memory of `session_id`.
    pub async fn clear_session(&self, session_id: &str) -> Result<ApiAck> {
        let url = self.endpoint(&["api", "session", session_id])?;
        self.send_json(self.http.delete(url), "clear session").await
    }

    // ── Chat ──────────────────────────────────────────────────────────────

    /// Send a chat message and return the streamed reply.
    ///
    /// Only the response headers are awaited here; the body is consumed
    /// through the returned [`ChatStream`].
    pub async fn chat(&self, message: &str, session_id: &str) -> Result<ChatStream> {
        const OP: &str = "send message";
        let url = self.endpoint(&["api", "chat"])?;
        let body = ChatRequest {
            message: message.to_string(),
            session_id: session_id.to_string(),
        };

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport(OP, e))?;
        let response = check_status(response, OP)?;

        debug!(session = session_id, "chat stream opened");
        Ok(EventStream::new(response.bytes_stream().boxed()))
    }

    // ── Extractor ─────────────────────────────────────────────────────────

    /// Generate title, tags and summary for `text` without saving it.
    pub async fn extract_metadata(&self, text: &str) -> Result<ExtractedMetadata> {
        let url = self.endpoint(&["api", "extract"])?;
        let body = ExtractRequest {
            text: text.to_string(),
        };
        self.send_json(self.http.post(url).json(&body), "extract metadata")
            .await
    }

    /// Generate metadata for `text` and store it as a new document.
    pub async fn extract_and_save(&self, text: &str, kind: DocKind) -> Result<SavedDocument> {
        let url = self.endpoint(&["api", "extract", "save"])?;
        let body = ExtractAndSaveRequest {
            text: text.to_string(),
            kind,
        };
        self.send_json(self.http.post(url).json(&body), "save to KB")
            .await
    }

    // ── Knowledge base ────────────────────────────────────────────────────

    pub async fn fetch_kb_index(&self) -> Result<Vec<KbIndexEntry>> {
        let url = self.endpoint(&["api", "kb"])?;
        self.send_json(self.http.get(url), "fetch KB index").await
    }

    /// Fetch one full document. A 404 maps to [`AgentError::NotFound`].
    pub async fn fetch_kb_document(&self, id: &str) -> Result<KbDocument> {
        let url = self.endpoint(&["api", "kb", id])?;
        match self.send_json(self.http.get(url), "fetch document").await {
            Err(AgentError::Status { status: 404, .. }) => {
                Err(AgentError::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    pub async fn update_kb_document(
        &self,
        id: &str,
        update: &KbDocumentUpdate,
    ) -> Result<ApiAck> {
        let url = self.endpoint(&["api", "kb", id])?;
        self.send_json(self.http.put(url).json(update), "update document")
            .await
    }

    pub async fn delete_kb_document(&self, id: &str) -> Result<ApiAck> {
        let url = self.endpoint(&["api", "kb", id])?;
        self.send_json(self.http.delete(url), "delete document")
            .await
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AgentError::Config(format!("API URL {} cannot carry a path", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T> {
        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| transport(operation, e))?;
        let response = check_status(response, operation)?;
        let body = response.bytes().await.map_err(|e| transport(operation, e))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn check_status(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(operation, %status, "backend returned an error status");
        Err(AgentError::Status {
            operation,
            status: status.as_u16(),
        })
    }
}

fn transport(operation: &'static str, err: reqwest::Error) -> AgentError {
    AgentError::Transport {
        operation,
        message: err.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
