//! Infrastructure adapters. Implement ports.
//!
//! Chat backend (HTTP or offline mock) and the terminal shell. Map errors to DomainError.

pub mod backend;
pub mod ui;
