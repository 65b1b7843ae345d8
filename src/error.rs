//! Ballchasing Error Types
//!
//! Error handling for the ballchasing API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for ballchasing operations
#[derive(Debug, Error)]
pub enum BallchasingError {
    /// Configuration errors (invalid JSON, bad header values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API key could be found in config files or the environment
    #[error("No API key configured. Set BALLCHASING_API_KEY or add `api_key` to ballchasing.json")]
    MissingApiKey,

    /// Connection could not be established, or timed out
    #[error("Transport error after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status other than 429
    #[error("Request failed with status {status}: {body}")]
    Remote { status: StatusCode, body: String },

    /// Response body did not match the expected schema
    #[error("Unexpected response from {endpoint}: {message}")]
    Validation { endpoint: String, message: String },

    /// Local file system errors during upload or download
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BallchasingError {
    /// HTTP status of a remote failure
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BallchasingError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a transport failure caused by a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, BallchasingError::Transport { source, .. } if source.is_timeout())
    }

    /// Whether the server rejected an upload because the replay already exists
    pub fn is_duplicate_replay(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// Id of the already uploaded replay, when the server reported a duplicate
    pub fn duplicate_replay_id(&self) -> Option<String> {
        match self {
            BallchasingError::Remote { status, body } if *status == StatusCode::CONFLICT => {
                serde_json::from_str::<serde_json::Value>(body)
                    .ok()?
                    .get("id")?
                    .as_str()
                    .map(str::to_string)
            }
            _ => None,
        }
    }
}

/// Result type alias for ballchasing operations
pub type Result<T> = std::result::Result<T, BallchasingError>;
