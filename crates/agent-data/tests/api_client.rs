//! End-to-end tests of `ApiClient` against an in-process mock backend.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_data::core::models::{DocKind, DocStatus, KbDocumentUpdate, StreamEvent};
use agent_data::core::AgentError;
use agent_data::ApiClient;
use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};

// ── Mock backend ──────────────────────────────────────────────────────────────

/// Every request body the mock received, tagged with its route.
#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockState {
    fn record(&self, route: impl Into<String>, body: Value) {
        self.requests.lock().unwrap().push((route.into(), body));
    }

    fn take(&self) -> Vec<(String, Value)> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

type Shared = Arc<MockState>;

async fn chat(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.record("chat", body);
    // The second object is deliberately split across two chunks.
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(
            b"{\"type\":\"step\",\"content\":\"Reading your message...\"}\n{\"type\":\"in",
        )),
        Ok(Bytes::from_static(
            b"fo\",\"content\":\"Found 2 relevant examples.\"}\n",
        )),
        Ok(Bytes::from_static(
            b"{\"type\":\"answer\",\"content\":\"Use [Source: abcdef123456]\"}",
        )),
    ];
    Response::builder()
        .header("content-type", "application/x-ndjson")
        .body(Body::from_stream(futures_util::stream::iter(chunks)))
        .unwrap()
}

async fn kb_index() -> Json<Value> {
    Json(json!([
        {"id": "a1", "title": "Price rows", "tags": ["impex"], "summary": "s",
         "status": "verified", "ai_created": true},
        {"id": "b2"}
    ]))
}

async fn kb_document(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Document not found"})))
            .into_response();
    }
    if id == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({
        "id": id, "title": "Price rows", "content": "INSERT_UPDATE PriceRow;",
        "tags": ["impex"], "type": "code", "status": "unverified",
        "created_at": "2024-05-01T10:00:00"
    }))
    .into_response()
}

async fn kb_update(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(format!("update {id}"), body);
    Json(json!({"status": "success", "message": "Document updated"}))
}

async fn kb_delete(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    state.record(format!("delete {id}"), Value::Null);
    Json(json!({"status": "success", "message": "Document deleted"}))
}

async fn clear_session(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    state.record(format!("clear {id}"), Value::Null);
    Json(json!({"status": "success"}))
}

async fn extract(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.record("extract", body);
    Json(json!({"title": "Price rows", "tags": ["impex", "price"], "summary": "Loads prices"}))
}

async fn extract_save(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.record("extract/save", body);
    Json(json!({"id": "new-1", "title": "Price rows", "tags": ["impex"], "summary": "x"}))
}

async fn spawn_backend() -> (SocketAddr, Shared) {
    let state: Shared = Arc::new(MockState::default());
    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/kb", get(kb_index))
        .route(
            "/api/kb/:id",
            get(kb_document).put(kb_update).delete(kb_delete),
        )
        .route("/api/session/:id", delete(clear_session))
        .route("/api/extract", post(extract))
        .route("/api/extract/save", post(extract_save))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_streams_events_in_order() {
    let (addr, state) = spawn_backend().await;
    let client = client_for(addr);

    let stream = client.chat("how do I load prices?", "sess-1").await.unwrap();
    let events = stream.collect_events().await.unwrap();

    assert_eq!(
        events,
        vec![
            StreamEvent::Step {
                content: "Reading your message...".into()
            },
            StreamEvent::Info {
                content: "Found 2 relevant examples.".into()
            },
            StreamEvent::Answer {
                content: "Use [Source: abcdef123456]".into()
            },
        ]
    );

    let requests = state.take();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].1,
        json!({"message": "how do I load prices?", "session_id": "sess-1"})
    );
}

#[tokio::test]
async fn test_fetch_index_applies_defaults() {
    let (addr, _) = spawn_backend().await;
    let index = client_for(addr).fetch_kb_index().await.unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index[0].title, "Price rows");
    assert!(index[0].ai_created);
    assert_eq!(index[1].title, "Untitled");
    assert_eq!(index[1].status, DocStatus::Verified);
}

#[tokio::test]
async fn test_fetch_document() {
    let (addr, _) = spawn_backend().await;
    let doc = client_for(addr).fetch_kb_document("a1").await.unwrap();

    assert_eq!(doc.id, "a1");
    assert_eq!(doc.kind, DocKind::Code);
    assert_eq!(doc.status, DocStatus::Unverified);
    assert_eq!(doc.created_at.as_deref(), Some("2024-05-01T10:00:00"));
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let (addr, _) = spawn_backend().await;
    let err = client_for(addr)
        .fetch_kb_document("missing")
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::NotFound(ref id) if id == "missing"));
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let (addr, _) = spawn_backend().await;
    let err = client_for(addr)
        .fetch_kb_document("broken")
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Status { status: 500, .. }));
    assert_eq!(err.to_string(), "Failed to fetch document: HTTP 500");
}

#[tokio::test]
async fn test_verify_sends_only_status() {
    let (addr, state) = spawn_backend().await;
    let ack = client_for(addr)
        .update_kb_document("a1", &KbDocumentUpdate::verify())
        .await
        .unwrap();

    assert_eq!(ack.status.as_deref(), Some("success"));
    assert_eq!(
        state.take(),
        vec![("update a1".to_string(), json!({"status": "verified"}))]
    );
}

#[tokio::test]
async fn test_full_update_body() {
    let (addr, state) = spawn_backend().await;
    let update = KbDocumentUpdate {
        title: Some("New".into()),
        content: Some("body".into()),
        summary: Some("sum".into()),
        tags: Some(vec!["x".into(), "y".into()]),
        kind: Some(DocKind::Text),
        status: Some(DocStatus::Unverified),
        ai_created: None,
    };
    client_for(addr)
        .update_kb_document("a1", &update)
        .await
        .unwrap();

    let (_, body) = state.take().remove(0);
    assert_eq!(
        body,
        json!({
            "title": "New", "content": "body", "summary": "sum",
            "tags": ["x", "y"], "type": "text", "status": "unverified"
        })
    );
}

#[tokio::test]
async fn test_delete_and_clear_session() {
    let (addr, state) = spawn_backend().await;
    let client = client_for(addr);

    client.delete_kb_document("a1").await.unwrap();
    client.clear_session("old-session").await.unwrap();

    let routes: Vec<String> = state.take().into_iter().map(|(r, _)| r).collect();
    assert_eq!(routes, vec!["delete a1", "clear old-session"]);
}

#[tokio::test]
async fn test_extract_and_save() {
    let (addr, state) = spawn_backend().await;
    let client = client_for(addr);

    let meta = client.extract_metadata("INSERT_UPDATE PriceRow;").await.unwrap();
    assert_eq!(meta.tags, vec!["impex", "price"]);

    let saved = client
        .extract_and_save("INSERT_UPDATE PriceRow;", DocKind::Text)
        .await
        .unwrap();
    assert_eq!(saved.id, "new-1");

    let requests = state.take();
    assert_eq!(requests[0].1, json!({"text": "INSERT_UPDATE PriceRow;"}));
    assert_eq!(
        requests[1].1,
        json!({"text": "INSERT_UPDATE PriceRow;", "type": "text"})
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr).fetch_kb_index().await.unwrap_err();
    assert!(err.is_connection_error(), "got {err:?}");
}
