//! One chat turn: open the stream and forward its events.

use agent_core::error::AgentError;
use agent_core::models::StreamEvent;
use agent_data::ApiClient;
use tokio::sync::mpsc;

/// Progress of a chat turn as seen by the consumer.
#[derive(Debug)]
pub enum ChatUpdate {
    /// One decoded stream line.
    Event(StreamEvent),
    /// The request could not be made or the stream broke off.
    Failed(AgentError),
    /// The stream ended normally.
    Finished,
}

/// Send `message` and forward every update to `tx`.
///
/// Exactly one terminal update (`Failed` or `Finished`) is sent last.
/// Returns early, without a terminal update, when the receiver is gone.
pub async fn run_turn<T>(
    client: &ApiClient,
    message: &str,
    session_id: &str,
    tx: &mpsc::Sender<T>,
) where
    T: From<ChatUpdate>,
{
    let mut stream = match client.chat(message, session_id).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "chat request failed");
            let _ = tx.send(ChatUpdate::Failed(e).into()).await;
            return;
        }
    };

    let mut events = 0usize;
    while let Some(next) = stream.next_event().await {
        let update = match next {
            Ok(event) => {
                events += 1;
                ChatUpdate::Event(event)
            }
            Err(e) => {
                tracing::warn!(error = %e, events, "chat stream interrupted");
                let _ = tx.send(ChatUpdate::Failed(e).into()).await;
                return;
            }
        };
        if tx.send(update.into()).await.is_err() {
            tracing::debug!("chat consumer dropped; abandoning stream");
            return;
        }
    }

    tracing::debug!(events, "chat stream finished");
    let _ = tx.send(ChatUpdate::Finished.into()).await;
}
