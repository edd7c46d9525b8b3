//! Domain layer for kb-agent.
//!
//! Wire types for the knowledge-base backend, the crate-wide error type,
//! CLI settings, chat-session rotation, the streaming transcript reducer,
//! citation parsing and knowledge-base filtering.

pub mod citations;
pub mod error;
pub mod filters;
pub mod formatting;
pub mod models;
pub mod session;
pub mod settings;
pub mod transcript;

pub use error::{AgentError, Result};
