//! Runtime layer for the knowledge-base agent client.
//!
//! Runs backend requests off the UI thread, streams chat turns, and manages
//! the persisted chat session.

pub mod chat;
pub mod orchestrator;
pub mod session_manager;

pub use agent_core as core;
pub use agent_data as data;
