//! Chat backend adapters. Implement `BackendGateway`.
//!
//! HTTP gateway for the real service, mock gateway for offline runs.

pub mod http_gateway;
pub mod mock_gateway;
pub mod wire;

pub use http_gateway::HttpBackendGateway;
pub use mock_gateway::MockBackendGateway;
