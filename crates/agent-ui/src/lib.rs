//! Terminal UI layer for kb-agent.
//!
//! Provides themes, the header and badge components, the chat, knowledge-base
//! and extractor views, modal dialogs, and the main application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod chat_view;
pub mod components;
pub mod extractor_view;
pub mod kb_view;
pub mod modal;
pub mod themes;

pub use agent_core as core;
