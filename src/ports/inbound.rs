//! Inbound port. The presentation shell drives the workspace through it.

use crate::domain::DomainError;

/// Input port: terminal UI (or any other shell) runs the workspace session.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive workspace until the user leaves.
    async fn run(&self) -> Result<(), DomainError>;
}
