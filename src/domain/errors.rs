//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Network error or non-2xx status from the chat backend.
    #[error("Backend gateway error: {0}")]
    Gateway(String),

    /// Health check failed; sending is blocked until the backend is back.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Response decode error: {0}")]
    Decode(String),

    /// A user action that does not fit the current artifact (e.g. picking a drama with no ranking shown).
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Config error: {0}")]
    Config(String),
}
