//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ChatReply, DomainError};

/// Chat backend gateway. One instance is bound to one backend session id.
#[async_trait::async_trait]
pub trait BackendGateway: Send + Sync {
    /// `POST /api/chat`. Network errors and non-2xx statuses are `DomainError::Gateway`.
    async fn send_message(&self, text: &str) -> Result<ChatReply, DomainError>;

    /// `POST /api/reset`: clear the backend's state for this session.
    async fn reset_session(&self) -> Result<(), DomainError>;

    /// `GET /api/workflow/{session_id}`. Shape is backend-defined.
    async fn workflow_snapshot(&self) -> Result<serde_json::Value, DomainError>;

    /// `GET /health`. Any failure, including network errors, is `false`.
    async fn health_check(&self) -> bool;

    /// Session id this gateway speaks for.
    fn session_id(&self) -> &str;
}
