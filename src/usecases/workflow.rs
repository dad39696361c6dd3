//! Workflow session: the state machine behind the workspace.
//!
//! Owns the conversation, the current step, the displayed artifact and the local
//! selection. Every mutation happens in one of the transition methods below, and
//! they all take `&mut self`, so at most one backend request per session is in flight.
//!
//! Two kinds of input drive it:
//! - local actions (pick a drama, confirm platforms, confirm the script, regenerate),
//! - backend replies to free-text messages, classified into a [`ResponseHint`].
//!
//! A failed request never transitions: an error turn is appended and the user can retry.

use crate::domain::platform;
use crate::domain::script_template;
use crate::domain::{Adoption, Artifact, Drama, DomainError, ResponseHint, Selection, WorkflowStep};
use crate::ports::BackendGateway;
use crate::usecases::conversation::{ConversationStore, GREETING_AGENT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const SYSTEM_AGENT: &str = "系统";
pub const SCRIPT_AGENT: &str = "短剧脚本大师";
pub const REQUEST_FAILED_TEXT: &str = "抱歉，与AI服务通信时出现错误。请确保后端服务正在运行。";
pub const BACKEND_DOWN_BANNER: &str = "后端服务未启动，请先运行后端服务";
pub const BACKEND_DOWN_INSTRUCTION: &str = "后端服务未启动，请先启动后端服务（python backend/backend_api.py）后再发送消息";
pub const RESET_TEXT: &str = "会话已重置。我们可以从今日短剧排行榜重新开始。";
pub const CONFIRM_SCRIPT_TEXT: &str = "脚本确认，开始剪辑吧！";
pub const ALL_PLATFORMS_LABEL: &str = "全部平台";

/// What a turn did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The backend answered. `artifact_changed` is true when the panel was swapped.
    Delivered { artifact_changed: bool },
    /// The request failed; an error turn was appended and nothing else changed.
    RequestFailed,
    /// Blank input; nothing was sent.
    Ignored,
}

/// One workspace session. Created on workspace entry, dropped on exit.
pub struct WorkflowSession {
    gateway: Arc<dyn BackendGateway>,
    conversation: ConversationStore,
    step: WorkflowStep,
    artifact: Artifact,
    /// Bumped on every artifact swap.
    artifact_revision: u64,
    selection: Selection,
    backend_error: Option<String>,
    /// Pause before revealing a new artifact so the chat reply lands first.
    reveal_delay: Duration,
}

impl WorkflowSession {
    pub fn new(gateway: Arc<dyn BackendGateway>, reveal_delay: Duration) -> Self {
        Self {
            gateway,
            conversation: ConversationStore::with_greeting(),
            step: WorkflowStep::Idle,
            artifact: Artifact::None,
            artifact_revision: 0,
            selection: Selection::default(),
            backend_error: None,
            reveal_delay,
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn artifact_revision(&self) -> u64 {
        self.artifact_revision
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Banner text while the backend is considered down.
    pub fn backend_error(&self) -> Option<&str> {
        self.backend_error.as_deref()
    }

    pub fn session_id(&self) -> &str {
        self.gateway.session_id()
    }

    /// Probe `/health` and set or clear the offline banner.
    pub async fn check_backend(&mut self) -> bool {
        let healthy = self.gateway.health_check().await;
        if healthy {
            self.backend_error = None;
        } else {
            warn!(session_id = %self.gateway.session_id(), "backend health check failed");
            self.backend_error = Some(BACKEND_DOWN_BANNER.to_string());
        }
        healthy
    }

    /// Send free text to the backend and apply whatever the reply hints at.
    pub async fn send_message(&mut self, text: &str) -> Result<TurnOutcome, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        self.ensure_backend()?;

        self.conversation.push_user(text);
        let Some(reply) = self.exchange(text).await else {
            return Ok(TurnOutcome::RequestFailed);
        };

        let hint = ResponseHint::classify(&reply, text, &self.selection);
        info!(hint = hint.name(), step = self.step.index(), "applying response hint");
        let artifact_changed = self.apply_hint(hint).await;
        Ok(TurnOutcome::Delivered { artifact_changed })
    }

    /// Pick the drama at 1-based `rank` from the displayed ranking list.
    pub async fn select_drama(&mut self, rank: usize) -> Result<TurnOutcome, DomainError> {
        let drama = match &self.artifact {
            Artifact::RankingList { dramas } => dramas
                .iter()
                .find(|d| d.rank == rank)
                .cloned()
                .ok_or_else(|| DomainError::InvalidAction(format!("no drama at rank {}", rank)))?,
            other => {
                return Err(DomainError::InvalidAction(format!(
                    "cannot pick a drama while showing {}",
                    other.kind()
                )));
            }
        };
        self.ensure_backend()?;

        let message = format!("我想选择《{}》这个短剧来做推广", drama.title);
        self.conversation.push_user(&message);
        if self.exchange(&message).await.is_none() {
            return Ok(TurnOutcome::RequestFailed);
        }

        info!(title = %drama.title, rank, "drama selected");
        self.selection.drama = Some(drama.clone());
        self.advance(WorkflowStep::AwaitingPlatformSelection);
        self.pace().await;
        self.swap_artifact(Artifact::PlatformPicker {
            drama,
            platforms: platform::catalog(),
        });
        Ok(TurnOutcome::Delivered {
            artifact_changed: true,
        })
    }

    /// Confirm the platforms picked in the platform picker. Ids may be aliases.
    pub async fn confirm_platforms<S: AsRef<str>>(
        &mut self,
        raw_ids: &[S],
    ) -> Result<TurnOutcome, DomainError> {
        let Artifact::PlatformPicker { drama, .. } = &self.artifact else {
            return Err(DomainError::InvalidAction(format!(
                "cannot confirm platforms while showing {}",
                self.artifact.kind()
            )));
        };
        let drama = drama.clone();
        let platform_ids = platform::normalize_all(raw_ids);
        if platform_ids.is_empty() {
            return Err(DomainError::InvalidAction(
                "select at least one platform".to_string(),
            ));
        }
        self.ensure_backend()?;

        let names: Vec<String> = platform_ids
            .iter()
            .map(|id| platform::resolve(id).name)
            .collect();
        let message = format!("我选择推广到：{}", names.join("、"));
        self.conversation.push_user(&message);
        if self.exchange(&message).await.is_none() {
            return Ok(TurnOutcome::RequestFailed);
        }

        info!(platforms = ?platform_ids, "platforms confirmed");
        if self.selection.drama.is_none() {
            self.selection.drama = Some(drama.clone());
        }
        self.selection.platform_ids = platform_ids.clone();
        self.advance(WorkflowStep::AwaitingScriptConfirmation);
        self.pace().await;
        let set = script_template::build_set(&drama, &platform_ids);
        self.swap_artifact(Artifact::ScriptSet(set));
        Ok(TurnOutcome::Delivered {
            artifact_changed: true,
        })
    }

    /// Regenerate one platform's script (or all of them). Local only; no backend call.
    pub async fn regenerate_scripts(&mut self, platform_id: Option<&str>) -> Result<(), DomainError> {
        let Artifact::ScriptSet(set) = &self.artifact else {
            return Err(DomainError::InvalidAction(format!(
                "no scripts to regenerate while showing {}",
                self.artifact.kind()
            )));
        };

        let targets = platform_id.map(|p| vec![platform::normalize(p)]);
        if let Some(t) = &targets {
            if !set.scripts.iter().any(|s| s.platform_id == t[0]) {
                return Err(DomainError::InvalidAction(format!(
                    "no script for platform {}",
                    t[0]
                )));
            }
        }
        let next = script_template::regenerate(set, targets.as_deref());
        let label = platform_id
            .map(|p| platform::resolve(p).name)
            .unwrap_or_else(|| ALL_PLATFORMS_LABEL.to_string());

        self.conversation.push_user(format!("修改脚本（{}）", label));
        self.pace().await;
        self.swap_artifact(Artifact::ScriptSet(next));
        self.conversation.push_assistant(
            Some(SCRIPT_AGENT),
            format!(
                "我已根据最新思路为{}重新生成了一版脚本，您可以展开查看。若需进一步微调，请告诉我更具体的方向～",
                label
            ),
        );
        info!(scope = %label, "scripts regenerated");
        Ok(())
    }

    /// Accept the scripts and start the (simulated) editing stage.
    pub async fn confirm_script(&mut self) -> Result<TurnOutcome, DomainError> {
        let Artifact::ScriptSet(set) = &self.artifact else {
            return Err(DomainError::InvalidAction(format!(
                "cannot start editing while showing {}",
                self.artifact.kind()
            )));
        };
        let drama = self.selection.drama.clone().unwrap_or_else(|| set.drama.clone());
        let platform_ids = if self.selection.platform_ids.is_empty() {
            set.platform_ids.clone()
        } else {
            self.selection.platform_ids.clone()
        };
        self.ensure_backend()?;

        self.conversation.push_user(CONFIRM_SCRIPT_TEXT);
        if self.exchange(CONFIRM_SCRIPT_TEXT).await.is_none() {
            return Ok(TurnOutcome::RequestFailed);
        }

        self.advance(WorkflowStep::Editing);
        self.pace().await;
        self.swap_artifact(Artifact::EditingSession {
            drama: Some(drama),
            platforms: platform_ids.iter().map(|id| platform::resolve(id)).collect(),
        });
        Ok(TurnOutcome::Delivered {
            artifact_changed: true,
        })
    }

    /// Reset the backend session, then the local workflow. On failure nothing changes.
    pub async fn reset(&mut self) -> Result<(), DomainError> {
        self.gateway.reset_session().await?;
        self.selection = Selection::default();
        self.step = WorkflowStep::Idle;
        self.swap_artifact(Artifact::None);
        self.conversation.push_assistant(Some(GREETING_AGENT), RESET_TEXT);
        info!(session_id = %self.gateway.session_id(), "workspace reset");
        Ok(())
    }

    /// Backend's own view of the workflow, as reported by `/api/workflow/{id}`.
    pub async fn workflow_snapshot(&self) -> Result<serde_json::Value, DomainError> {
        self.gateway.workflow_snapshot().await
    }

    fn ensure_backend(&self) -> Result<(), DomainError> {
        match self.backend_error {
            Some(_) => Err(DomainError::BackendUnavailable(
                BACKEND_DOWN_INSTRUCTION.to_string(),
            )),
            None => Ok(()),
        }
    }

    /// Send `text` and append the reply, or the fixed error turn on failure.
    async fn exchange(&mut self, text: &str) -> Option<crate::domain::ChatReply> {
        match self.gateway.send_message(text).await {
            Ok(reply) => {
                self.conversation
                    .push_assistant(reply.agent_label.as_deref(), reply.text.clone());
                Some(reply)
            }
            Err(e) => {
                error!(error = %e, "chat request failed");
                self.conversation
                    .push_assistant(Some(SYSTEM_AGENT), REQUEST_FAILED_TEXT);
                None
            }
        }
    }

    async fn apply_hint(&mut self, hint: ResponseHint) -> bool {
        match hint {
            ResponseHint::RankingReady { dramas, adoption } => {
                self.advance(WorkflowStep::AwaitingRankingSelection);
                if let Some(adoption) = adoption {
                    self.adopt(adoption);
                }
                self.swap_artifact(Artifact::RankingList { dramas });
                true
            }
            ResponseHint::DramaConfirmed { title } => {
                let drama = Drama::titled(title);
                self.adopt(Adoption::Drama(drama.title.clone()));
                self.pace().await;
                self.swap_artifact(Artifact::PlatformPicker {
                    drama,
                    platforms: platform::catalog(),
                });
                true
            }
            ResponseHint::PlatformsConfirmed { platform_ids } => {
                self.adopt(Adoption::Platforms(platform_ids));
                false
            }
            ResponseHint::ScriptReady {
                drama_title,
                platform_ids,
            } => {
                let drama = match (drama_title, &self.selection.drama) {
                    (Some(t), Some(d)) if d.title == t => d.clone(),
                    (Some(t), _) => Drama::titled(t),
                    (None, Some(d)) => d.clone(),
                    (None, None) => return false,
                };
                let platform_ids = if platform_ids.is_empty() {
                    self.selection.platform_ids.clone()
                } else {
                    platform_ids
                };
                if self.selection.platform_ids.is_empty() && !platform_ids.is_empty() {
                    self.adopt(Adoption::Platforms(platform_ids.clone()));
                }
                self.advance(WorkflowStep::AwaitingScriptConfirmation);
                self.pace().await;
                let set = script_template::build_set(&drama, &platform_ids);
                self.swap_artifact(Artifact::ScriptSet(set));
                true
            }
            ResponseHint::EditingStarted => {
                self.advance(WorkflowStep::Editing);
                self.pace().await;
                self.swap_artifact(Artifact::EditingSession {
                    drama: self.selection.drama.clone(),
                    platforms: self
                        .selection
                        .platform_ids
                        .iter()
                        .map(|id| platform::resolve(id))
                        .collect(),
                });
                true
            }
            ResponseHint::NoHint => false,
        }
    }

    /// Take over a selection the backend confirmed. Callers check it is still unset.
    fn adopt(&mut self, adoption: Adoption) {
        match adoption {
            Adoption::Drama(title) => {
                info!(title = %title, "adopting drama from backend");
                self.selection.drama = Some(Drama::titled(title));
                self.advance(WorkflowStep::AwaitingPlatformSelection);
            }
            Adoption::Platforms(ids) => {
                info!(platforms = ?ids, "adopting platforms from backend");
                self.selection.platform_ids = platform::normalize_all(&ids);
                self.advance(WorkflowStep::AwaitingScriptConfirmation);
            }
        }
    }

    /// Move forward to `target`; never backward.
    fn advance(&mut self, target: WorkflowStep) {
        if target > self.step {
            debug!(from = self.step.index(), to = target.index(), "workflow step advanced");
            self.step = target;
        }
    }

    fn swap_artifact(&mut self, artifact: Artifact) {
        self.artifact = artifact;
        self.artifact_revision += 1;
        debug!(
            kind = self.artifact.kind(),
            revision = self.artifact_revision,
            "artifact swapped"
        );
    }

    async fn pace(&self) {
        if !self.reveal_delay.is_zero() {
            tokio::time::sleep(self.reveal_delay).await;
        }
    }
}
