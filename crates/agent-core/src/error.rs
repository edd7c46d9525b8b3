use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the kb-agent crates.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("Failed to {operation}: HTTP {status}")]
    Status { operation: &'static str, status: u16 },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Failed to {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The chat response body could not be read or decoded.
    #[error("Chat stream error: {0}")]
    Stream(String),

    /// The requested knowledge-base document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AgentError {
    /// `true` for failures where the backend could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, AgentError::Transport { .. })
    }
}

/// Convenience alias used throughout the kb-agent crates.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AgentError::FileRead {
            path: PathBuf::from("/some/session.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/session.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_status() {
        let err = AgentError::Status {
            operation: "fetch KB index",
            status: 503,
        };
        assert_eq!(err.to_string(), "Failed to fetch KB index: HTTP 503");
    }

    #[test]
    fn test_error_display_transport() {
        let err = AgentError::Transport {
            operation: "send message",
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to send message: connection refused");
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_status_error_is_not_connection_error() {
        let err = AgentError::Status {
            operation: "delete document",
            status: 500,
        };
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_error_display_not_found() {
        let err = AgentError::NotFound("abc123".to_string());
        assert_eq!(err.to_string(), "Document not found: abc123");
    }

    #[test]
    fn test_error_display_stream() {
        let err = AgentError::Stream("body closed".to_string());
        assert_eq!(err.to_string(), "Chat stream error: body closed");
    }

    #[test]
    fn test_error_display_config() {
        let err = AgentError::Config("invalid api url".to_string());
        assert_eq!(err.to_string(), "Configuration error: invalid api url");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AgentError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
