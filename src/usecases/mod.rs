//! Application use cases. Orchestrate domain logic via ports.

pub mod conversation;
pub mod editing;
pub mod workflow;

pub use conversation::ConversationStore;
pub use editing::{EditingEvent, EditingPlan, EditingRun};
pub use workflow::{TurnOutcome, WorkflowSession};
