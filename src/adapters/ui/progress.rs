//! Progress bars for the editing run (indicatif).
//!
//! One bar per platform plus a spinner line for the current stage. Ctrl-C
//! cancels the run and leaves unfinished bars abandoned.

use crate::domain::Platform;
use crate::usecases::editing::{EditingEvent, EditingPlan, EditingRun, STAGES};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;
use tracing::warn;

const BAR_TEMPLATE: &str = "{prefix:14} [{bar:32.magenta/blue}] {pos:>3}% {msg}";
const STAGE_TEMPLATE: &str = "{spinner:.magenta} {msg}";

/// Terminal view of one editing run.
pub struct EditingBoard {
    // keeps the draw target alive while bars are updated
    _multi: MultiProgress,
    stage: ProgressBar,
    bars: Vec<(String, ProgressBar)>,
}

impl EditingBoard {
    pub fn new(platforms: &[Platform]) -> Self {
        Self::with_target(platforms, ProgressDrawTarget::stderr())
    }

    fn with_target(platforms: &[Platform], target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let bar_style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        let stage_style = ProgressStyle::with_template(STAGE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let stage = multi.add(ProgressBar::new_spinner());
        stage.set_style(stage_style);
        stage.set_message(stage_label(STAGES[0]));
        stage.enable_steady_tick(Duration::from_millis(120));

        let bars = platforms
            .iter()
            .map(|p| {
                let pb = multi.add(ProgressBar::new(100));
                pb.set_style(bar_style.clone());
                pb.set_prefix(format!("{} {}", p.icon, p.name));
                pb.set_message("等待中");
                (p.id.clone(), pb)
            })
            .collect();

        Self {
            _multi: multi,
            stage,
            bars,
        }
    }

    fn bar(&self, platform_id: &str) -> Option<&ProgressBar> {
        self.bars
            .iter()
            .find(|(id, _)| id == platform_id)
            .map(|(_, pb)| pb)
    }

    pub fn apply(&self, event: &EditingEvent) {
        match event {
            EditingEvent::Progress {
                platform_id,
                percent,
            } => {
                if let Some(pb) = self.bar(platform_id) {
                    pb.set_position(u64::from(*percent));
                    pb.set_message("剪辑中");
                }
            }
            EditingEvent::Completed { platform_id } => {
                if let Some(pb) = self.bar(platform_id) {
                    pb.finish_with_message("✅ 已完成");
                }
            }
            EditingEvent::Stage(stage) => self.stage.set_message(stage_label(stage)),
        }
    }

    /// Close the board. Bars not yet finished are marked cancelled.
    pub fn finish(&self, all_completed: bool) {
        if all_completed {
            self.stage.finish_with_message("🎉 所有平台的推广视频已生成完毕");
        } else {
            self.stage.abandon_with_message("⏹ 剪辑已取消");
        }
        for (_, pb) in &self.bars {
            if !pb.is_finished() {
                pb.abandon_with_message("已取消");
            }
        }
    }
}

fn stage_label(stage: &str) -> String {
    format!("当前阶段：{}", stage)
}

/// Run the editing simulation for `platforms` and draw it until every
/// platform completes or the user presses Ctrl-C. Returns true when completed.
pub async fn play(platforms: &[Platform], plan: EditingPlan) -> bool {
    play_on(EditingBoard::new(platforms), platforms, plan).await
}

async fn play_on(board: EditingBoard, platforms: &[Platform], plan: EditingPlan) -> bool {
    let mut run = EditingRun::start(platforms, plan);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let next = tokio::select! {
            signal = &mut ctrl_c => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for ctrl-c");
                }
                None
            }
            event = run.next_event() => Some(event),
        };
        match next {
            Some(Some(event)) => board.apply(&event),
            Some(None) => break,
            None => {
                run.cancel();
                break;
            }
        }
    }

    let completed = run.all_completed();
    board.finish(completed);
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::platform;

    fn hidden_board(platforms: &[Platform]) -> EditingBoard {
        EditingBoard::with_target(platforms, ProgressDrawTarget::hidden())
    }

    #[test]
    fn test_board_tracks_events() {
        let platforms = vec![platform::resolve("tiktok"), platform::resolve("x")];
        let board = hidden_board(&platforms);
        board.apply(&EditingEvent::Progress {
            platform_id: "tiktok".to_string(),
            percent: 40,
        });
        board.apply(&EditingEvent::Completed {
            platform_id: "x".to_string(),
        });
        let tiktok = board.bar("tiktok").expect("tiktok bar");
        assert_eq!(tiktok.position(), 40);
        assert!(!tiktok.is_finished());
        assert!(board.bar("x").expect("x bar").is_finished());

        board.finish(false);
        assert!(tiktok.is_finished());
    }

    #[test]
    fn test_unknown_platform_event_is_ignored() {
        let board = hidden_board(&[platform::resolve("facebook")]);
        board.apply(&EditingEvent::Progress {
            platform_id: "weibo".to_string(),
            percent: 10,
        });
        assert_eq!(board.bar("facebook").expect("facebook bar").position(), 0);
    }

    #[tokio::test]
    async fn test_play_runs_to_completion() {
        let platforms = vec![platform::resolve("instagram"), platform::resolve("facebook")];
        let plan = EditingPlan {
            tick: Duration::from_millis(1),
            step_percent: 25,
            stagger: Duration::from_millis(1),
            stage_every: Duration::from_millis(2),
        };
        let board = hidden_board(&platforms);
        let done = tokio::time::timeout(Duration::from_secs(5), play_on(board, &platforms, plan))
            .await
            .expect("editing run should finish");
        assert!(done);
    }
}
