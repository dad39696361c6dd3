//! Text rendering of chat turns, the step bar and artifacts.

use crate::domain::{Artifact, Drama, Message, Role, Script, WorkflowStep};
use crossterm::style::Stylize;

/// Labels of the four visible steps, in order.
pub const STEP_LABELS: [&str; 4] = ["选择短剧", "选择平台", "生成脚本", "智能剪辑"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

/// Status of each visible step for the current workflow step.
pub fn step_statuses(step: WorkflowStep) -> [StepStatus; 4] {
    let s = step.index();
    let status = |done: bool, active: bool| {
        if done {
            StepStatus::Completed
        } else if active {
            StepStatus::Active
        } else {
            StepStatus::Pending
        }
    };
    [
        status(s >= 1, false),
        status(s >= 2, s == 1),
        status(s >= 3, s == 2),
        // editing is never "done" from the workspace's point of view
        status(false, s >= 4),
    ]
}

pub fn step_bar(step: WorkflowStep) -> String {
    STEP_LABELS
        .iter()
        .zip(step_statuses(step))
        .map(|(label, status)| match status {
            StepStatus::Completed => format!("✔ {}", label).green().to_string(),
            StepStatus::Active => format!("● {}", label).blue().to_string(),
            StepStatus::Pending => format!("○ {}", label).dark_grey().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" › ")
}

pub fn message(m: &Message) -> String {
    let time = m.created_at.format("%H:%M");
    match m.role {
        Role::User => format!("{} {}\n{}", "你".cyan().bold(), time, m.text),
        Role::Assistant => {
            let who = m.agent_label.as_deref().unwrap_or("AI助手");
            format!("{} {}\n{}", who.magenta().bold(), time, m.text)
        }
    }
}

/// One-line label used in the drama picker.
pub fn drama_option(d: &Drama) -> String {
    format!(
        "#{} {}  [{}] 播放 {} · 点赞 {} · 评分 {:.1}",
        d.rank, d.title, d.category, d.views_display, d.likes_display, d.rating_out_of_10
    )
}

pub fn script(s: &Script) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}  时长 {} · {}\n",
        s.platform_icon,
        s.platform_name.as_str().bold(),
        s.duration_label,
        s.hook_label
    ));
    out.push_str(&format!("  开场: {}\n", s.hook_text));
    for beat in &s.structure {
        let line = format!("  {:>8}  {}", beat.time_range, beat.content);
        if beat.highlighted {
            out.push_str(&line.yellow().to_string());
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out.push_str(&format!("  标签: {}\n", s.tags_text));
    out.push_str(&format!("  配乐: {}\n", s.music_text));
    out.push_str(&format!("  建议: {}\n", s.tip_text.as_str().dark_grey()));
    out
}

pub fn artifact(a: &Artifact) -> String {
    match a {
        Artifact::None => String::new(),
        Artifact::RankingList { dramas } => {
            let mut out = format!("{}\n", "🔥 今日短剧热度榜".bold());
            for d in dramas {
                out.push_str(&format!("  {}\n", drama_option(d)));
                if !d.description.is_empty() {
                    out.push_str(&format!("     {}\n", d.description.as_str().dark_grey()));
                }
            }
            out
        }
        Artifact::PlatformPicker { drama, platforms } => {
            let mut out = format!("{} 《{}》\n", "📣 选择推广平台".bold(), drama.title);
            for p in platforms {
                out.push_str(&format!("  {} {}  {}\n", p.icon, p.name, p.description));
            }
            out
        }
        Artifact::ScriptSet(set) => {
            let mut out = format!("{} 《{}》\n", "📝 推广脚本".bold(), set.drama.title);
            for s in &set.scripts {
                out.push_str(&script(s));
                out.push('\n');
            }
            out
        }
        Artifact::EditingSession { drama, platforms } => {
            let title = drama.as_ref().map(|d| d.title.as_str()).unwrap_or("未命名短剧");
            format!(
                "{} 正在为《{}》生成 {} 个平台的推广视频\n",
                "🎬 AI智能剪辑".bold(),
                title,
                platforms.len()
            )
        }
    }
}
