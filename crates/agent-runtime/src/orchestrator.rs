//! Async request orchestrator.
//!
//! The TUI never awaits the network itself. It submits [`Request`]s through
//! an [`OrchestratorHandle`]; a background tokio task runs each one and sends
//! the outcome back as a [`RuntimeEvent`] on an `mpsc` channel that the event
//! loop drains every tick.

use agent_core::error::Result;
use agent_core::models::{
    ApiAck, DocKind, ExtractedMetadata, KbDocument, KbDocumentUpdate, KbIndexEntry, SavedDocument,
};
use agent_data::ApiClient;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::chat::{self, ChatUpdate};
use crate::session_manager;

// ── Public types ──────────────────────────────────────────────────────────────

/// Work the UI can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    SendChat {
        message: String,
        session_id: String,
    },
    LoadIndex,
    /// Fetch a document for the read-only viewer.
    OpenDocument {
        id: String,
    },
    /// Fetch a document to populate the edit form.
    LoadForEdit {
        id: String,
    },
    SaveDocument {
        id: String,
        update: KbDocumentUpdate,
    },
    Verify {
        id: String,
    },
    Delete {
        id: String,
    },
    Extract {
        text: String,
    },
    ExtractAndSave {
        text: String,
        kind: DocKind,
    },
    /// Best-effort removal of an expired session on the backend. Produces
    /// no event.
    DiscardSession {
        session_id: String,
    },
}

/// Outcome of a [`Request`], forwarded to the presentation layer.
#[derive(Debug)]
pub enum RuntimeEvent {
    Chat(ChatUpdate),
    IndexLoaded(Result<Vec<KbIndexEntry>>),
    DocumentOpened(Result<KbDocument>),
    EditLoaded(Result<KbDocument>),
    DocumentSaved { id: String, result: Result<ApiAck> },
    Verified { id: String, result: Result<ApiAck> },
    Deleted { id: String, result: Result<ApiAck> },
    Extracted(Result<ExtractedMetadata>),
    ExtractSaved(Result<SavedDocument>),
}

impl From<ChatUpdate> for RuntimeEvent {
    fn from(update: ChatUpdate) -> Self {
        RuntimeEvent::Chat(update)
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Background request dispatcher.
///
/// Call [`Orchestrator::start`] to spin up the dispatch loop in a dedicated
/// tokio task.
pub struct Orchestrator {
    client: ApiClient,
}

impl Orchestrator {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Start the dispatch loop.
    ///
    /// Returns the receiver for [`RuntimeEvent`]s and a handle used to submit
    /// requests and stop the loop.
    pub fn start(self) -> (mpsc::Receiver<RuntimeEvent>, OrchestratorHandle) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            self.dispatch_loop(request_rx, event_tx).await;
        });

        (
            event_rx,
            OrchestratorHandle {
                requests: request_tx,
                handle,
            },
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Run every request in its own task until the request side closes,
    /// then wait for the in-flight ones.
    async fn dispatch_loop(
        self,
        mut requests: mpsc::UnboundedReceiver<Request>,
        events: mpsc::Sender<RuntimeEvent>,
    ) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => {
                        tracing::debug!(?request, "dispatching request");
                        tasks.spawn(execute(self.client.clone(), request, events.clone()));
                    }
                    None => break,
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "request task failed");
                    }
                }
            }
        }

        while tasks.join_next().await.is_some() {}
        tracing::debug!("request channel closed; dispatcher exiting");
    }
}

/// Perform one request and report its outcome.
async fn execute(client: ApiClient, request: Request, events: mpsc::Sender<RuntimeEvent>) {
    let event = match request {
        Request::SendChat {
            message,
            session_id,
        } => {
            chat::run_turn(&client, &message, &session_id, &events).await;
            return;
        }
        Request::LoadIndex => RuntimeEvent::IndexLoaded(client.fetch_kb_index().await),
        Request::OpenDocument { id } => {
            RuntimeEvent::DocumentOpened(client.fetch_kb_document(&id).await)
        }
        Request::LoadForEdit { id } => {
            RuntimeEvent::EditLoaded(client.fetch_kb_document(&id).await)
        }
        Request::SaveDocument { id, update } => {
            let result = client.update_kb_document(&id, &update).await;
            RuntimeEvent::DocumentSaved { id, result }
        }
        Request::Verify { id } => {
            let result = client
                .update_kb_document(&id, &KbDocumentUpdate::verify())
                .await;
            RuntimeEvent::Verified { id, result }
        }
        Request::Delete { id } => {
            let result = client.delete_kb_document(&id).await;
            RuntimeEvent::Deleted { id, result }
        }
        Request::Extract { text } => RuntimeEvent::Extracted(client.extract_metadata(&text).await),
        Request::ExtractAndSave { text, kind } => {
            RuntimeEvent::ExtractSaved(client.extract_and_save(&text, kind).await)
        }
        Request::DiscardSession { session_id } => {
            let _ = session_manager::discard_remote(client, session_id).await;
            return;
        }
    };

    if events.send(event).await.is_err() {
        tracing::debug!("event receiver dropped; result discarded");
    }
}

// ── OrchestratorHandle ────────────────────────────────────────────────────────

/// A handle to the background dispatcher.
///
/// Dropping it lets in-flight requests finish; [`abort`](Self::abort) stops
/// the loop immediately.
pub struct OrchestratorHandle {
    requests: mpsc::UnboundedSender<Request>,
    handle: tokio::task::JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Queue a request. Returns `false` when the dispatcher is gone.
    pub fn submit(&self, request: Request) -> bool {
        match self.requests.send(request) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(request = ?e.0, "dispatcher stopped; request dropped");
                false
            }
        }
    }

    /// Immediately abort the dispatcher and every in-flight request.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
