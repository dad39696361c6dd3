//! Domain entities. Pure data structures for the workspace.
//!
//! No HTTP/UI types here; the gateway adapter maps wire JSON into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A promotion target. Catalog entries live in [`crate::domain::platform`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Gradient token used by the shell when drawing the platform badge.
    pub color: String,
    pub description: String,
}

/// A short drama shown in the ranking list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drama {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub thumbnail_url: String,
    pub views_display: String,
    pub likes_display: String,
    /// 1-based position in the ranking it came from (0 when adopted from backend state).
    pub rank: usize,
    pub description: String,
    pub episode_count: u32,
    pub rating_out_of_10: f64,
}

impl Drama {
    /// Title-only drama, used when the backend confirms a selection by name.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            category: String::new(),
            thumbnail_url: String::new(),
            views_display: String::new(),
            likes_display: String::new(),
            rank: 0,
            description: String::new(),
            episode_count: 0,
            rating_out_of_10: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat turn. Append-only; see [`crate::usecases::ConversationStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub agent_label: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Progress through rank → drama → platforms → script → edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowStep {
    Idle = 0,
    AwaitingRankingSelection = 1,
    AwaitingPlatformSelection = 2,
    AwaitingScriptConfirmation = 3,
    Editing = 4,
}

impl WorkflowStep {
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// One timed beat of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBeat {
    pub time_range: String,
    pub content: String,
    pub highlighted: bool,
}

/// A generated promotional script for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub platform_id: String,
    pub platform_name: String,
    pub platform_icon: String,
    pub platform_color: String,
    pub duration_label: String,
    pub hook_label: String,
    pub hook_text: String,
    pub structure: Vec<ScriptBeat>,
    pub tags_text: String,
    pub music_text: String,
    pub tip_text: String,
}

/// Scripts for every chosen platform. Entries are shared so that regenerating one
/// platform leaves the others pointer-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSet {
    pub drama: Drama,
    pub scripts: Vec<Arc<Script>>,
    pub platform_ids: Vec<String>,
}

/// The single panel currently shown next to the conversation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Artifact {
    #[default]
    None,
    RankingList {
        dramas: Vec<Drama>,
    },
    PlatformPicker {
        drama: Drama,
        platforms: Vec<Platform>,
    },
    ScriptSet(ScriptSet),
    EditingSession {
        drama: Option<Drama>,
        platforms: Vec<Platform>,
    },
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::None => "none",
            Artifact::RankingList { .. } => "ranking-list",
            Artifact::PlatformPicker { .. } => "platform-picker",
            Artifact::ScriptSet(_) => "script-set",
            Artifact::EditingSession { .. } => "editing-session",
        }
    }
}

/// Locally selected entities. `platform_ids` holds canonical ids, unique, in pick order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub drama: Option<Drama>,
    pub platform_ids: Vec<String>,
}

/// One raw entry of the backend ranking (`ranking_data[]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub id: Option<u64>,
    pub title: String,
    pub views: String,
    pub score: f64,
    pub description: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
}

/// Backend-reported workflow state (`workflow_state`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub current_step: Option<String>,
    pub selected_drama: Option<String>,
    pub selected_platforms: Vec<String>,
    pub script: Option<String>,
    pub in_workflow: bool,
}

/// Decoded `/api/chat` reply. Every optional field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub agent_label: Option<String>,
    pub workflow: Option<WorkflowSnapshot>,
    pub current_step: Option<String>,
    pub ranking: Vec<RankingEntry>,
}

impl ChatReply {
    /// Top-level `current_step`, falling back to the one inside `workflow_state`.
    pub fn step_label(&self) -> Option<&str> {
        self.current_step
            .as_deref()
            .or_else(|| self.workflow.as_ref()?.current_step.as_deref())
    }
}
