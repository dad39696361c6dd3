//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the platform registry, script templates and response classification.

pub mod entities;
pub mod errors;
pub mod hint;
pub mod platform;
pub mod script_template;

pub use entities::{
    Artifact, ChatReply, Drama, Message, Platform, RankingEntry, Role, Script, ScriptBeat,
    ScriptSet, Selection, WorkflowSnapshot, WorkflowStep,
};
pub use errors::DomainError;
pub use hint::{Adoption, ResponseHint};
