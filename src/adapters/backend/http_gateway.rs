//! HTTP adapter for the chat backend.
//!
//! Implements `BackendGateway` over the backend's JSON API
//! (`/api/chat`, `/api/reset`, `/api/workflow/{id}`, `/health`).

use crate::adapters::backend::wire::{ChatRequest, ResetRequest, decode_chat_reply};
use crate::domain::{ChatReply, DomainError};
use crate::ports::BackendGateway;
use std::time::Duration;
use tracing::{debug, info, warn};

/// reqwest-backed gateway bound to one session id.
pub struct HttpBackendGateway {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl HttpBackendGateway {
    /// Create a gateway.
    ///
    /// # Arguments
    /// * `base_url` - Backend root (e.g. "http://localhost:8000"); a trailing slash is ignored
    /// * `session_id` - Backend session this workspace talks to
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        session_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into `DomainError::Gateway`, keeping a short body excerpt.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %text, "backend returned error");
        Err(DomainError::Gateway(format!(
            "API error {}: {}",
            status,
            text.chars().take(200).collect::<String>()
        )))
    }
}

#[async_trait::async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn send_message(&self, text: &str) -> Result<ChatReply, DomainError> {
        info!(
            session_id = %self.session_id,
            len = text.chars().count(),
            "sending chat message"
        );

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&ChatRequest {
                message: text,
                session_id: &self.session_id,
            })
            .send()
            .await
            .map_err(|e| DomainError::Gateway(format!("HTTP request failed: {}", e)))?;
        let response = Self::ensure_success(response).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::Decode(format!("Failed to parse chat response: {}", e)))?;
        let reply = decode_chat_reply(&body);

        debug!(
            agent = reply.agent_label.as_deref().unwrap_or("-"),
            step = reply.step_label().unwrap_or("-"),
            ranking = reply.ranking.len(),
            "chat reply decoded"
        );
        Ok(reply)
    }

    async fn reset_session(&self) -> Result<(), DomainError> {
        let response = self
            .client
            .post(self.url("/api/reset"))
            .json(&ResetRequest {
                session_id: &self.session_id,
            })
            .send()
            .await
            .map_err(|e| DomainError::Gateway(format!("HTTP request failed: {}", e)))?;
        Self::ensure_success(response).await?;
        info!(session_id = %self.session_id, "backend session reset");
        Ok(())
    }

    async fn workflow_snapshot(&self) -> Result<serde_json::Value, DomainError> {
        let response = self
            .client
            .get(self.url(&format!("/api/workflow/{}", self.session_id)))
            .send()
            .await
            .map_err(|e| DomainError::Gateway(format!("HTTP request failed: {}", e)))?;
        let response = Self::ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| DomainError::Decode(format!("Failed to parse workflow state: {}", e)))
    }

    async fn health_check(&self) -> bool {
        match self.client.get(self.url("/health")).send().await {
            Ok(r) if r.status().is_success() => true,
            Ok(r) => {
                warn!(status = %r.status(), "backend health check failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "backend unreachable");
                false
            }
        }
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
