//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the presentation shell into the application
//! - Outbound: Called by the application into the chat backend

pub mod inbound;
pub mod outbound;

pub use inbound::InputPort;
pub use outbound::BackendGateway;
