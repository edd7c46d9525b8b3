//! Chat response body → [`StreamEvent`] sequence.

use std::collections::VecDeque;
use std::fmt::Display;

use agent_core::error::{AgentError, Result};
use agent_core::models::StreamEvent;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};

use crate::ndjson::{parse_line, LineDecoder};

/// The event stream returned by [`ApiClient::chat`](crate::ApiClient::chat).
pub type ChatStream = EventStream<BoxStream<'static, reqwest::Result<Bytes>>>;

/// Pulls byte chunks from `S` and yields parsed chat events in arrival order.
///
/// Malformed lines are skipped. A transport error ends the stream after
/// being reported once.
pub struct EventStream<S> {
    inner: S,
    decoder: LineDecoder,
    pending: VecDeque<StreamEvent>,
    finished: bool,
}

impl<S, E> EventStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: Display,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: LineDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Next event, `None` once the body is exhausted.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.finished {
                return None;
            }

            match self.inner.next().await {
                Some(Ok(chunk)) => {
                    let lines = self.decoder.push(&chunk);
                    self.pending
                        .extend(lines.iter().filter_map(|line| parse_line(line)));
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(AgentError::Stream(e.to_string())));
                }
                None => {
                    self.finished = true;
                    if let Some(event) = self.decoder.finish().and_then(|l| parse_line(&l)) {
                        self.pending.push_back(event);
                    }
                }
            }
        }
    }

    /// Drain the whole stream, stopping at the first transport error.
    pub async fn collect_events(mut self) -> Result<Vec<StreamEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event?);
        }
        Ok(events)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
