//! Mock backend gateway for running the workspace without the chat service.
//!
//! Keeps a small in-memory workflow and answers with canned replies. Simulates
//! network latency with a configurable delay.

use crate::domain::hint::{STEP_EDITING, STEP_SCRIPT_CREATED, is_ranking_intent};
use crate::domain::{ChatReply, DomainError, RankingEntry, WorkflowSnapshot, platform};
use crate::ports::BackendGateway;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// (title, views, score, description, tags)
const DEMO_RANKING: [(&str, &str, f64, &str, [&str; 3]); 5] = [
    ("霸道总裁的替身新娘", "8500万", 95.0, "灰姑娘被迫替嫁霸总，却意外获得真爱", ["霸总", "甜宠", "替嫁"]),
    ("重生之豪门千金归来", "7200万", 92.0, "豪门千金重生复仇，智斗渣男白莲花", ["重生", "复仇", "豪门"]),
    ("闪婚后被大佬宠上天", "6800万", 89.0, "契约婚姻变真爱，大佬日常宠妻", ["闪婚", "宠文", "大佬"]),
    ("穿越成恶毒女配怎么办", "5600万", 85.0, "穿越成恶毒女配，改写命运逆袭人生", ["穿越", "逆袭", "女配"]),
    ("全能大佬她马甲掉了", "5200万", 83.0, "隐藏身份的大佬马甲一个个掉落", ["马甲", "大佬", "打脸"]),
];

/// Keywords scanned (lower-cased) to pick platforms out of free text.
const PLATFORM_KEYWORDS: [&str; 9] = [
    "tiktok", "抖音", "douyin", "facebook", "fb", "instagram", "ins", "twitter", "推特",
];

const CONFIRM_KEYWORDS: [&str; 3] = ["确认", "开始剪辑", "剪辑"];

#[derive(Debug, Default)]
struct MockState {
    selected_drama: Option<String>,
    selected_platforms: Vec<String>,
    script: Option<String>,
    current_step: String,
    in_workflow: bool,
}

impl MockState {
    fn fresh() -> Self {
        Self {
            current_step: "init".to_string(),
            ..Default::default()
        }
    }

    fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            current_step: Some(self.current_step.clone()),
            selected_drama: self.selected_drama.clone(),
            selected_platforms: self.selected_platforms.clone(),
            script: self.script.clone(),
            in_workflow: self.in_workflow,
        }
    }
}

/// Offline gateway.
pub struct MockBackendGateway {
    session_id: String,
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    healthy: bool,
    state: Mutex<MockState>,
}

impl MockBackendGateway {
    /// Create a mock gateway that sleeps `delay_ms` before every chat reply.
    pub fn with_delay(session_id: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            session_id: session_id.into(),
            delay_ms,
            healthy: true,
            state: Mutex::new(MockState::fresh()),
        }
    }

    /// A mock whose health check fails, for exercising the offline banner.
    pub fn unhealthy(session_id: impl Into<String>) -> Self {
        Self {
            healthy: false,
            ..Self::with_delay(session_id, 0)
        }
    }

    fn ranking() -> Vec<RankingEntry> {
        DEMO_RANKING
            .iter()
            .enumerate()
            .map(|(i, (title, views, score, description, tags))| RankingEntry {
                id: Some(i as u64 + 1),
                title: (*title).to_string(),
                views: (*views).to_string(),
                score: *score,
                description: (*description).to_string(),
                tags: tags.iter().map(|t| (*t).to_string()).collect(),
                image: None,
            })
            .collect()
    }
}

/// Text between 《 and 》, if any.
fn quoted_title(text: &str) -> Option<String> {
    let start = text.find('《')? + '《'.len_utf8();
    let end = start + text[start..].find('》')?;
    let title = text[start..end].trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Canonical platform ids mentioned in `text`, in keyword order, deduplicated.
fn extract_platforms(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let found: Vec<&str> = PLATFORM_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect();
    let mut ids = platform::normalize_all(&found);
    // A bare "x" is too common a letter to scan for; accept it as a whole word only.
    if lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|w| w == "x")
        && !ids.iter().any(|id| id == "x")
    {
        ids.push("x".to_string());
    }
    ids
}

#[async_trait::async_trait]
impl BackendGateway for MockBackendGateway {
    async fn send_message(&self, text: &str) -> Result<ChatReply, DomainError> {
        info!(len = text.chars().count(), "[MOCK] simulating chat reply");
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let mut state = self.state.lock().await;
        let (reply_text, agent, ranking) = if is_ranking_intent(text) {
            state.in_workflow = true;
            (
                "[MOCK] 这是今日短剧热度榜单，点击任意短剧即可开始推广。".to_string(),
                "短剧榜单助手",
                Self::ranking(),
            )
        } else if let Some(title) = quoted_title(text) {
            state.selected_drama = Some(title.clone());
            state.current_step = "drama_selected".to_string();
            state.in_workflow = true;
            (
                format!("[MOCK] 已选择《{}》，想推广到哪些平台？", title),
                "平台推广顾问",
                Vec::new(),
            )
        } else if !extract_platforms(text).is_empty() {
            state.selected_platforms = extract_platforms(text);
            state.current_step = if state.selected_drama.is_some() {
                STEP_SCRIPT_CREATED.to_string()
            } else {
                "platform_selected".to_string()
            };
            (
                format!("[MOCK] 已记录平台：{}", state.selected_platforms.join("、")),
                "脚本创作大师",
                Vec::new(),
            )
        } else if CONFIRM_KEYWORDS.iter().any(|k| text.contains(k)) {
            state.script = Some("已确认".to_string());
            state.current_step = STEP_EDITING.to_string();
            (
                "[MOCK] 脚本已确认，开始智能剪辑。".to_string(),
                "视频剪辑师",
                Vec::new(),
            )
        } else {
            (
                "[MOCK] 我可以帮你查看今日短剧排行榜，或者为选定的短剧制作推广视频。".to_string(),
                "通用助手",
                Vec::new(),
            )
        };

        Ok(ChatReply {
            text: reply_text,
            agent_label: Some(agent.to_string()),
            workflow: Some(state.snapshot()),
            current_step: Some(state.current_step.clone()),
            ranking,
        })
    }

    async fn reset_session(&self) -> Result<(), DomainError> {
        *self.state.lock().await = MockState::fresh();
        Ok(())
    }

    async fn workflow_snapshot(&self) -> Result<serde_json::Value, DomainError> {
        let state = self.state.lock().await;
        Ok(serde_json::json!({
            "session_id": self.session_id,
            "workflow_state": state.snapshot(),
            "current_step": state.current_step,
        }))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_title() {
        assert_eq!(
            quoted_title("我想选择《示例短剧》这个短剧来做推广").as_deref(),
            Some("示例短剧")
        );
        assert_eq!(quoted_title("没有书名号"), None);
        assert_eq!(quoted_title("《》"), None);
    }

    #[test]
    fn test_extract_platforms() {
        assert_eq!(extract_platforms("我选择推广到：TikTok、Instagram"), vec!["tiktok", "instagram"]);
        assert_eq!(extract_platforms("发到抖音和 X 上"), vec!["tiktok", "x"]);
        assert!(extract_platforms("随便聊聊").is_empty());
    }

    #[tokio::test]
    async fn test_mock_workflow() {
        let gw = MockBackendGateway::with_delay("t", 0);

        let reply = gw.send_message("今天的短剧排行榜").await.unwrap();
        assert_eq!(reply.ranking.len(), 5);
        assert_eq!(reply.agent_label.as_deref(), Some("短剧榜单助手"));

        let reply = gw.send_message("我想选择《示例短剧》这个短剧来做推广").await.unwrap();
        assert_eq!(
            reply.workflow.unwrap().selected_drama.as_deref(),
            Some("示例短剧")
        );

        let reply = gw.send_message("我选择推广到：TikTok").await.unwrap();
        assert_eq!(reply.current_step.as_deref(), Some(STEP_SCRIPT_CREATED));

        let reply = gw.send_message("脚本确认，开始剪辑吧！").await.unwrap();
        assert_eq!(reply.current_step.as_deref(), Some(STEP_EDITING));

        gw.reset_session().await.unwrap();
        let snap = gw.workflow_snapshot().await.unwrap();
        assert_eq!(snap["current_step"], "init");
        assert!(snap["workflow_state"]["selected_drama"].is_null());
    }
}
