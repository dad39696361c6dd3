//! Simulated editing run: per-platform progress counters on their own timers.
//!
//! Each platform starts after `index × stagger` and advances `step_percent` every
//! `tick` until it reaches 100. A separate timer cycles the stage label. All timers
//! belong to one cancellation group owned by the [`EditingRun`]; cancelling the run
//! or dropping it stops every timer.

use crate::domain::Platform;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Stage labels shown while editing, in cycle order.
pub const STAGES: [&str; 5] = ["分析脚本", "智能剪辑", "添加特效", "配乐合成", "最终渲染"];

/// Timer settings for a run.
#[derive(Debug, Clone, Copy)]
pub struct EditingPlan {
    pub tick: Duration,
    pub step_percent: u8,
    pub stagger: Duration,
    pub stage_every: Duration,
}

impl Default for EditingPlan {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            step_percent: 2,
            stagger: Duration::from_millis(2000),
            stage_every: Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditingEvent {
    Progress { platform_id: String, percent: u8 },
    Completed { platform_id: String },
    Stage(&'static str),
}

/// A running (or finished) editing simulation.
pub struct EditingRun {
    cancel: CancellationToken,
    tasks: JoinSet<()>,
    rx: mpsc::UnboundedReceiver<EditingEvent>,
    /// (platform id, percent) in platform order.
    progress: Vec<(String, u8)>,
    completed: Vec<String>,
    stage: &'static str,
}

impl EditingRun {
    /// Spawn one timer per platform plus the stage cycler. Needs a tokio runtime.
    pub fn start(platforms: &[Platform], plan: EditingPlan) -> Self {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();
        // interval() panics on a zero period
        let tick = plan.tick.max(Duration::from_millis(1));
        let step = plan.step_percent.max(1);

        for (index, p) in platforms.iter().enumerate() {
            let tx = tx.clone();
            let token = cancel.child_token();
            let platform_id = p.id.clone();
            let start_after = plan.stagger * index as u32;
            tasks.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = run_platform(platform_id, start_after, tick, step, tx) => {}
                }
            });
        }

        if !platforms.is_empty() {
            let token = cancel.child_token();
            let every = plan.stage_every.max(Duration::from_millis(1));
            tasks.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = cycle_stages(every, tx) => {}
                }
            });
        }

        info!(platforms = platforms.len(), "editing run started");
        Self {
            cancel,
            tasks,
            rx,
            progress: platforms.iter().map(|p| (p.id.clone(), 0)).collect(),
            completed: Vec::new(),
            stage: STAGES[0],
        }
    }

    /// Wait for the next event and fold it into the run's state.
    /// Returns `None` once every platform is complete or the run was cancelled.
    pub async fn next_event(&mut self) -> Option<EditingEvent> {
        if self.all_completed() {
            self.cancel.cancel();
            return None;
        }
        let event = self.rx.recv().await?;
        match &event {
            EditingEvent::Progress {
                platform_id,
                percent,
            } => {
                if let Some(entry) = self.progress.iter_mut().find(|(id, _)| id == platform_id) {
                    entry.1 = *percent;
                }
            }
            EditingEvent::Completed { platform_id } => {
                if !self.completed.contains(platform_id) {
                    self.completed.push(platform_id.clone());
                    debug!(platform = %platform_id, "platform editing complete");
                }
                if self.all_completed() {
                    info!(platforms = self.completed.len(), "editing run complete");
                    self.cancel.cancel();
                }
            }
            EditingEvent::Stage(stage) => self.stage = *stage,
        }
        Some(event)
    }

    /// Stop every timer. Safe to call more than once.
    pub fn cancel(&mut self) {
        if !self.cancel.is_cancelled() {
            info!(
                completed = self.completed.len(),
                total = self.progress.len(),
                "editing run cancelled"
            );
        }
        self.cancel.cancel();
        self.tasks.abort_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn all_completed(&self) -> bool {
        self.completed.len() == self.progress.len()
    }

    pub fn percent(&self, platform_id: &str) -> u8 {
        self.progress
            .iter()
            .find(|(id, _)| id == platform_id)
            .map(|(_, p)| *p)
            .unwrap_or(0)
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }
}

impl Drop for EditingRun {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_platform(
    platform_id: String,
    start_after: Duration,
    tick: Duration,
    step: u8,
    tx: mpsc::UnboundedSender<EditingEvent>,
) {
    tokio::time::sleep(start_after).await;
    let mut ticker = tokio::time::interval(tick);
    ticker.tick().await;
    let mut percent: u8 = 0;
    while percent < 100 {
        ticker.tick().await;
        percent = percent.saturating_add(step).min(100);
        let event = EditingEvent::Progress {
            platform_id: platform_id.clone(),
            percent,
        };
        if tx.send(event).is_err() {
            return;
        }
    }
    let _ = tx.send(EditingEvent::Completed { platform_id });
}

async fn cycle_stages(every: Duration, tx: mpsc::UnboundedSender<EditingEvent>) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    for stage in STAGES.iter().cycle().skip(1) {
        ticker.tick().await;
        if tx.send(EditingEvent::Stage(*stage)).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::platform;

    fn fast_plan() -> EditingPlan {
        EditingPlan {
            tick: Duration::from_millis(1),
            step_percent: 20,
            stagger: Duration::from_millis(2),
            stage_every: Duration::from_millis(3),
        }
    }

    #[tokio::test]
    async fn test_run_completes_every_platform() {
        let platforms = vec![platform::resolve("tiktok"), platform::resolve("x")];
        let mut run = EditingRun::start(&platforms, fast_plan());

        let mut last_seen: Vec<(String, u8)> = Vec::new();
        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = run.next_event().await {
                if let EditingEvent::Progress {
                    platform_id,
                    percent,
                } = event
                {
                    let prev = last_seen
                        .iter()
                        .find(|(id, _)| *id == platform_id)
                        .map(|(_, p)| *p)
                        .unwrap_or(0);
                    assert!(percent > prev, "progress must increase");
                    last_seen.retain(|(id, _)| *id != platform_id);
                    last_seen.push((platform_id, percent));
                }
            }
        })
        .await;
        assert!(drained.is_ok(), "run did not finish");
        assert!(run.all_completed());
        assert_eq!(run.percent("tiktok"), 100);
        assert_eq!(run.percent("x"), 100);
        let mut done = run.completed().to_vec();
        done.sort();
        assert_eq!(done, vec!["tiktok", "x"]);
        assert!(run.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_stops_timers() {
        let platforms = vec![platform::resolve("facebook")];
        let plan = EditingPlan {
            tick: Duration::from_secs(60),
            ..fast_plan()
        };
        let mut run = EditingRun::start(&platforms, plan);
        run.cancel();
        let next = tokio::time::timeout(Duration::from_secs(2), run.next_event()).await;
        assert_eq!(next.expect("channel should close after cancel"), None);
        assert!(!run.all_completed());
        assert_eq!(run.percent("facebook"), 0);
    }

    #[tokio::test]
    async fn test_drop_stops_timers() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let base = metrics.num_alive_tasks();
        let plan = EditingPlan {
            tick: Duration::from_secs(60),
            ..fast_plan()
        };
        let run = EditingRun::start(
            &[platform::resolve("tiktok"), platform::resolve("x")],
            plan,
        );
        tokio::task::yield_now().await;
        assert_eq!(metrics.num_alive_tasks(), base + 3);

        drop(run);
        let settled = tokio::time::timeout(Duration::from_secs(2), async {
            while metrics.num_alive_tasks() > base {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await;
        assert!(settled.is_ok(), "timers still alive after drop");
    }

    #[tokio::test]
    async fn test_later_platforms_wait_for_stagger() {
        let plan = EditingPlan {
            tick: Duration::from_millis(1),
            step_percent: 10,
            stagger: Duration::from_secs(60),
            stage_every: Duration::from_secs(60),
        };
        let mut run = EditingRun::start(
            &[platform::resolve("tiktok"), platform::resolve("facebook")],
            plan,
        );
        let progressed = tokio::time::timeout(Duration::from_secs(5), async {
            while run.percent("tiktok") < 50 {
                if run.next_event().await.is_none() {
                    break;
                }
            }
        })
        .await;
        assert!(progressed.is_ok());
        assert!(run.percent("tiktok") >= 50);
        assert_eq!(run.percent("facebook"), 0);
        assert!(run.completed().is_empty());
    }

    #[tokio::test]
    async fn test_empty_run_is_complete() {
        let mut run = EditingRun::start(&[], fast_plan());
        assert!(run.all_completed());
        assert_eq!(run.next_event().await, None);
    }

    #[tokio::test]
    async fn test_stage_starts_at_first_label() {
        let run = EditingRun::start(&[platform::resolve("instagram")], EditingPlan::default());
        assert_eq!(run.stage(), STAGES[0]);
    }
}
