//! Backend access layer for kb-agent.
//!
//! Talks to the knowledge-base backend over HTTP, and turns the chat
//! endpoint's newline-delimited JSON body into a sequence of
//! [`StreamEvent`](agent_core::models::StreamEvent)s.

pub mod client;
pub mod ndjson;
pub mod stream;

pub use agent_core as core;
pub use client::ApiClient;
pub use stream::{ChatStream, EventStream};
