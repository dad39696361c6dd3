//! Implements InputPort. Inquire-based interactive workspace.
//!
//! Each loop prints new chat turns, re-renders the artifact when its revision
//! changed, then prompts according to what the artifact offers.

use crate::adapters::ui::{progress, render};
use crate::domain::{Artifact, DomainError};
use crate::ports::InputPort;
use crate::usecases::editing::EditingPlan;
use crate::usecases::{TurnOutcome, WorkflowSession};
use async_trait::async_trait;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{InquireError, MultiSelect, Select, Text};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const CHAT_OPTION: &str = "💬 输入消息";
const CONFIRM_SCRIPT_OPTION: &str = "✅ 确认脚本，开始剪辑";
const REGENERATE_ALL_OPTION: &str = "🔄 重新生成全部脚本";
const REGENERATE_ONE_OPTION: &str = "✏️ 重新生成单个平台脚本";
const HELP_TEXT: &str = "/reset 重置会话 · /state 查看工作流 · /quit 退出";

/// Neon theme for every inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightMagenta))
        .with_answered_prompt_prefix(Styled::new("✔").with_fg(Color::LightGreen))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(Color::LightCyan))
        .with_selected_checkbox(Styled::new("◉").with_fg(Color::LightMagenta))
        .with_unselected_checkbox(Styled::new("○").with_fg(Color::DarkGrey));
    inquire::set_global_render_config(config);
}

/// What the user asked for at one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Chat(String),
    PickDrama(usize),
    ConfirmPlatforms(Vec<String>),
    ConfirmScript,
    Regenerate(Option<String>),
    Reset,
    ShowState,
    Quit,
    Nothing,
}

/// Parse a line typed at the chat prompt.
fn parse_command(line: &str) -> Action {
    match line.trim() {
        "" => Action::Nothing,
        "/quit" | "/exit" | "/q" => Action::Quit,
        "/reset" => Action::Reset,
        "/state" => Action::ShowState,
        text => Action::Chat(text.to_string()),
    }
}

/// Map an inquire failure: Esc falls through to `on_cancel`, Ctrl-C quits.
fn prompt_result<T>(
    result: Result<T, InquireError>,
    on_cancel: impl FnOnce() -> Result<Action, DomainError>,
    on_answer: impl FnOnce(T) -> Result<Action, DomainError>,
) -> Result<Action, DomainError> {
    match result {
        Ok(answer) => on_answer(answer),
        Err(InquireError::OperationCanceled) => on_cancel(),
        Err(InquireError::OperationInterrupted) => Ok(Action::Quit),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

fn prompt_chat() -> Result<Action, DomainError> {
    prompt_result(
        Text::new("").with_help_message(HELP_TEXT).prompt(),
        || Ok(Action::Nothing),
        |line| Ok(parse_command(&line)),
    )
}

fn prompt_for(artifact: &Artifact) -> Result<Action, DomainError> {
    match artifact {
        Artifact::RankingList { dramas } => {
            let mut options: Vec<String> = dramas.iter().map(render::drama_option).collect();
            options.push(CHAT_OPTION.to_string());
            prompt_result(
                Select::new("选择要推广的短剧", options).raw_prompt(),
                prompt_chat,
                |picked| match dramas.get(picked.index) {
                    Some(d) => Ok(Action::PickDrama(d.rank)),
                    None => prompt_chat(),
                },
            )
        }
        Artifact::PlatformPicker { platforms, .. } => {
            let options: Vec<String> = platforms
                .iter()
                .map(|p| format!("{} {}", p.icon, p.name))
                .collect();
            prompt_result(
                MultiSelect::new("选择推广平台（空格勾选，回车确认，Esc 改为输入消息）", options)
                    .raw_prompt(),
                prompt_chat,
                |picked| {
                    let ids: Vec<String> = picked
                        .iter()
                        .filter_map(|o| platforms.get(o.index))
                        .map(|p| p.id.clone())
                        .collect();
                    if ids.is_empty() {
                        println!("{}", "请至少选择一个平台".yellow());
                        return Ok(Action::Nothing);
                    }
                    Ok(Action::ConfirmPlatforms(ids))
                },
            )
        }
        Artifact::ScriptSet(set) => {
            let options = vec![
                CONFIRM_SCRIPT_OPTION,
                REGENERATE_ALL_OPTION,
                REGENERATE_ONE_OPTION,
                CHAT_OPTION,
            ];
            prompt_result(
                Select::new("脚本操作", options).prompt(),
                prompt_chat,
                |picked| match picked {
                    CONFIRM_SCRIPT_OPTION => Ok(Action::ConfirmScript),
                    REGENERATE_ALL_OPTION => Ok(Action::Regenerate(None)),
                    REGENERATE_ONE_OPTION => {
                        let names: Vec<String> = set
                            .scripts
                            .iter()
                            .map(|s| format!("{} {}", s.platform_icon, s.platform_name))
                            .collect();
                        prompt_result(
                            Select::new("重新生成哪个平台的脚本？", names).raw_prompt(),
                            || Ok(Action::Nothing),
                            |one| {
                                Ok(set
                                    .scripts
                                    .get(one.index)
                                    .map(|s| Action::Regenerate(Some(s.platform_id.clone())))
                                    .unwrap_or(Action::Nothing))
                            },
                        )
                    }
                    _ => prompt_chat(),
                },
            )
        }
        Artifact::None | Artifact::EditingSession { .. } => prompt_chat(),
    }
}

/// Show a spinner while `fut` runs.
async fn with_spinner<T>(label: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

fn report_error(e: &DomainError) {
    match e {
        DomainError::BackendUnavailable(msg) => println!("{}", format!("⚠ {}", msg).red()),
        DomainError::InvalidAction(msg) => println!("{}", msg.as_str().yellow()),
        other => println!("{}", format!("✖ {}", other).red()),
    }
}

/// TUI adapter. Holds the workspace session for its lifetime.
pub struct TuiInputPort {
    session: Mutex<WorkflowSession>,
    editing_plan: EditingPlan,
}

impl TuiInputPort {
    pub fn new(session: WorkflowSession, editing_plan: EditingPlan) -> Self {
        Self {
            session: Mutex::new(session),
            editing_plan,
        }
    }

    async fn perform(&self, session: &mut WorkflowSession, action: Action) -> Result<(), DomainError> {
        if session.backend_error().is_some() {
            session.check_backend().await;
        }
        let outcome = match action {
            Action::Chat(text) => with_spinner("AI 正在思考…", session.send_message(&text)).await?,
            Action::PickDrama(rank) => with_spinner("正在确认短剧…", session.select_drama(rank)).await?,
            Action::ConfirmPlatforms(ids) => {
                with_spinner("正在生成脚本…", session.confirm_platforms(&ids[..])).await?
            }
            Action::ConfirmScript => with_spinner("正在准备剪辑…", session.confirm_script()).await?,
            Action::Regenerate(platform_id) => {
                with_spinner("正在重新生成脚本…", session.regenerate_scripts(platform_id.as_deref()))
                    .await?;
                return Ok(());
            }
            Action::Reset => {
                with_spinner("正在重置会话…", session.reset()).await?;
                return Ok(());
            }
            Action::ShowState => {
                let snapshot = with_spinner("正在获取工作流…", session.workflow_snapshot()).await?;
                let pretty = serde_json::to_string_pretty(&snapshot)
                    .map_err(|e| DomainError::Decode(e.to_string()))?;
                println!("{}", "后端工作流状态".bold());
                println!("{}", pretty);
                println!("{}", render::step_bar(session.step()));
                return Ok(());
            }
            Action::Quit | Action::Nothing => return Ok(()),
        };
        debug!(?outcome, "turn finished");
        if outcome == TurnOutcome::RequestFailed {
            session.check_backend().await;
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut session = self.session.lock().await;
        let mut last_message = 0u64;
        let mut shown_revision = 0u64;

        loop {
            for m in session.conversation().since(last_message) {
                println!("{}\n", render::message(m));
                last_message = m.id;
            }
            if let Some(banner) = session.backend_error() {
                println!("{}", format!("⚠ {}", banner).red().bold());
            }

            if session.artifact_revision() != shown_revision {
                shown_revision = session.artifact_revision();
                println!("{}", render::step_bar(session.step()));
                print!("{}", render::artifact(session.artifact()));
                let editing = match session.artifact() {
                    Artifact::EditingSession { platforms, .. } => Some(platforms.clone()),
                    _ => None,
                };
                if let Some(platforms) = editing {
                    if !progress::play(&platforms, self.editing_plan).await {
                        warn!("editing run interrupted");
                    }
                }
            }

            let action = prompt_for(session.artifact())?;
            if action == Action::Quit {
                println!("{}", "再见！".magenta());
                return Ok(());
            }
            if let Err(e) = self.perform(&mut session, action).await {
                report_error(&e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  "), Action::Nothing);
        assert_eq!(parse_command("/quit"), Action::Quit);
        assert_eq!(parse_command("/reset"), Action::Reset);
        assert_eq!(parse_command(" /state "), Action::ShowState);
        assert_eq!(
            parse_command("今日排行榜"),
            Action::Chat("今日排行榜".to_string())
        );
    }

    #[test]
    fn test_prompt_result_mapping() {
        let quit = prompt_result::<()>(
            Err(InquireError::OperationInterrupted),
            || Ok(Action::Nothing),
            |_| Ok(Action::Reset),
        );
        assert_eq!(quit.ok(), Some(Action::Quit));

        let cancelled = prompt_result::<()>(
            Err(InquireError::OperationCanceled),
            || Ok(Action::ShowState),
            |_| Ok(Action::Reset),
        );
        assert_eq!(cancelled.ok(), Some(Action::ShowState));

        let answered = prompt_result(Ok(3usize), || Ok(Action::Nothing), |rank| {
            Ok(Action::PickDrama(rank))
        });
        assert_eq!(answered.ok(), Some(Action::PickDrama(3)));
    }
}
