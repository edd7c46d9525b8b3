mod bootstrap;

use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;

use agent_core::models::StreamEvent;
use agent_core::session::SessionState;
use agent_core::settings::Settings;
use agent_core::transcript::Conversation;
use agent_data::ApiClient;
use agent_runtime::chat::{self, ChatUpdate};
use agent_runtime::orchestrator::Orchestrator;
use agent_runtime::session_manager::{self, SessionManager};
use agent_ui::app::{App, View};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let agent_dir = bootstrap::ensure_directories()?;
    // One-shot mode writes to the terminal, so it logs to stderr unless a
    // file was requested.
    let log_file = match (&settings.log_file, &settings.ask) {
        (Some(path), _) => Some(path.clone()),
        (None, None) => Some(bootstrap::default_log_file(&agent_dir)),
        (None, Some(_)) => None,
    };
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("kb-agent v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "API: {}, View: {}, Theme: {}",
        settings.normalized_api_url(),
        settings.view,
        settings.theme
    );

    let session_path = SessionState::state_path();
    if settings.clear {
        if let Err(e) = SessionState::clear_at(&session_path) {
            tracing::warn!(error = %e, "could not remove saved session");
        }
    }

    let client = ApiClient::new(&settings.normalized_api_url(), settings.request_timeout())?;

    let mut sessions = SessionManager::new(session_path, settings.idle_timeout());
    let resolution = sessions.initialize(Utc::now());
    let cleanup = resolution
        .expired
        .clone()
        .map(|old| session_manager::discard_remote(client.clone(), old));
    if resolution.rotated {
        tracing::info!(session = %resolution.session_id, "starting a new chat session");
    }

    if let Some(question) = settings.ask.as_deref() {
        let outcome = ask(&client, &mut sessions, &resolution.session_id, question).await;
        if let Some(cleanup) = cleanup {
            let _ = cleanup.await;
        }
        return outcome;
    }

    tracing::info!("Starting interactive session...");

    let (rx, handle) = Orchestrator::new(client).start();
    let app = App::new(
        &settings.theme,
        View::from_name(&settings.view),
        settings.normalized_api_url(),
        resolution.session_id.clone(),
    )
    .with_session(sessions);

    // Run the TUI event loop. The loop exits on Ctrl+C inside the TUI.
    // We also listen for Ctrl+C at the OS level so that signals received
    // while the terminal is in raw mode are handled cleanly.
    tokio::select! {
        result = app.run(rx, &handle) => {
            handle.abort();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            handle.abort();
        }
    }

    Ok(())
}

/// Stream one answer: thinking steps go to stderr, the answer to stdout.
async fn ask(
    client: &ApiClient,
    sessions: &mut SessionManager,
    session_id: &str,
    question: &str,
) -> Result<()> {
    let mut conversation = Conversation::new();
    let Some(message) = conversation.begin_turn(question) else {
        anyhow::bail!("--ask needs a non-empty message");
    };

    let (tx, mut rx) = mpsc::channel::<ChatUpdate>(64);
    let producer = async move {
        chat::run_turn(client, &message, session_id, &tx).await;
    };

    let consumer = async {
        let mut failure = None;
        let mut stderr = std::io::stderr();
        while let Some(update) = rx.recv().await {
            match update {
                ChatUpdate::Event(event) => {
                    if let StreamEvent::Step { content } | StreamEvent::Info { content } = &event {
                        let _ = writeln!(stderr, "… {content}");
                    }
                    conversation.apply(event);
                }
                ChatUpdate::Failed(e) => {
                    conversation.fail();
                    failure = Some(e);
                }
                ChatUpdate::Finished => conversation.finish(),
            }
        }
        failure
    };

    let ((), failure) = tokio::join!(producer, consumer);
    sessions.touch(Utc::now());

    if let Some(answer) = conversation.messages().last() {
        println!("{}", answer.content);
    }
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
