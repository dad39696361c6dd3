//! Wire format of the chat backend and lenient decoding into domain types.
//!
//! Response structs derive `Deserialize` with per-field lenient deserializers:
//! an absent, null or mistyped field is treated as absent rather than failing the
//! whole reply.

use crate::domain::{ChatReply, RankingEntry, WorkflowSnapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `POST /api/chat` body.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

/// `POST /api/reset` body.
#[derive(Debug, Serialize)]
pub struct ResetRequest<'a> {
    pub session_id: &'a str,
}

/// `POST /api/chat` response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatResponse {
    #[serde(deserialize_with = "lenient_text")]
    response: Option<String>,
    #[serde(deserialize_with = "lenient")]
    agent_name: Option<String>,
    #[serde(deserialize_with = "lenient_object")]
    workflow_state: Option<WorkflowStateWire>,
    #[serde(deserialize_with = "lenient")]
    current_step: Option<String>,
    #[serde(deserialize_with = "lenient_entries")]
    ranking_data: Vec<RankingEntryWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkflowStateWire {
    #[serde(deserialize_with = "lenient")]
    current_step: Option<String>,
    #[serde(deserialize_with = "lenient")]
    selected_drama: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    selected_platforms: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    script: Option<String>,
    #[serde(deserialize_with = "lenient")]
    in_workflow: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RankingEntryWire {
    #[serde(deserialize_with = "lenient")]
    id: Option<u64>,
    #[serde(deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    views: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    score: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    description: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    tags: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    image: Option<String>,
}

/// Any value that does not decode as `T` (including null) becomes `None`.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(d)?;
    Ok(serde_json::from_value(v).ok())
}

/// Like [`lenient`], but only JSON objects are accepted (no positional structs).
fn lenient_object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(d)?;
    Ok(v.is_object().then(|| serde_json::from_value(v).ok()).flatten())
}

/// String fields sometimes arrive as numbers (e.g. `views: 8500`).
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Numeric fields sometimes arrive as strings (e.g. `score: "95"`).
fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Array of strings; non-string items are dropped, a non-array is empty.
fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|i| match i {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Array of ranking entries; items that are not objects are skipped.
fn lenient_entries<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RankingEntryWire>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|i| serde_json::from_value(i).ok())
            .collect(),
        _ => Vec::new(),
    })
}

impl From<RankingEntryWire> for RankingEntry {
    fn from(w: RankingEntryWire) -> Self {
        RankingEntry {
            id: w.id,
            title: w.title.unwrap_or_default(),
            views: w.views.unwrap_or_default(),
            score: w.score.unwrap_or(0.0),
            description: w.description.unwrap_or_default(),
            tags: w.tags,
            image: w.image,
        }
    }
}

impl From<WorkflowStateWire> for WorkflowSnapshot {
    fn from(w: WorkflowStateWire) -> Self {
        WorkflowSnapshot {
            current_step: w.current_step,
            selected_drama: w.selected_drama,
            selected_platforms: w.selected_platforms,
            script: w.script,
            in_workflow: w.in_workflow.unwrap_or(false),
        }
    }
}

impl From<ChatResponse> for ChatReply {
    fn from(r: ChatResponse) -> Self {
        ChatReply {
            text: r.response.unwrap_or_default(),
            agent_label: r.agent_name,
            workflow: r.workflow_state.map(WorkflowSnapshot::from),
            current_step: r.current_step,
            ranking: r.ranking_data.into_iter().map(RankingEntry::from).collect(),
        }
    }
}

/// Decode a `/api/chat` JSON body. Never fails; missing pieces decode as absent,
/// and a body that is not an object decodes as an empty reply.
pub fn decode_chat_reply(v: &Value) -> ChatReply {
    if !v.is_object() {
        return ChatReply::default();
    }
    ChatResponse::deserialize(v)
        .map(ChatReply::from)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_reply() {
        let body = json!({
            "response": "这是今日榜单",
            "agent_name": "短剧榜单助手",
            "workflow_state": {
                "current_step": "init",
                "selected_drama": null,
                "selected_platforms": [],
                "script": null,
                "in_workflow": true
            },
            "current_step": "init",
            "ranking_data": [
                {"id": 1, "title": "霸道总裁的替身新娘", "views": "8500万", "score": 95,
                 "description": "灰姑娘被迫替嫁霸总", "tags": ["霸总", "甜宠"], "image": "/a.jpg"},
                {"id": 2, "title": "重生之豪门千金归来", "views": "7200万", "score": 92,
                 "description": "", "tags": [], "image": "/b.jpg"}
            ]
        });
        let reply = decode_chat_reply(&body);
        assert_eq!(reply.text, "这是今日榜单");
        assert_eq!(reply.agent_label.as_deref(), Some("短剧榜单助手"));
        assert_eq!(reply.current_step.as_deref(), Some("init"));
        let wf = reply.workflow.expect("workflow");
        assert!(wf.in_workflow);
        assert_eq!(wf.selected_drama, None);
        assert_eq!(reply.ranking.len(), 2);
        assert_eq!(reply.ranking[0].id, Some(1));
        assert_eq!(reply.ranking[0].score, 95.0);
        assert_eq!(reply.ranking[1].title, "重生之豪门千金归来");
    }

    #[test]
    fn test_decode_tolerates_missing_and_mistyped_fields() {
        let body = json!({
            "response": "hi",
            "workflow_state": "not-an-object",
            "ranking_data": {"oops": true},
            "current_step": 3
        });
        let reply = decode_chat_reply(&body);
        assert_eq!(reply.text, "hi");
        assert_eq!(reply.agent_label, None);
        assert_eq!(reply.workflow, None);
        assert_eq!(reply.current_step, None);
        assert!(reply.ranking.is_empty());
    }

    #[test]
    fn test_decode_skips_non_object_ranking_entries() {
        let body = json!({
            "ranking_data": [ {"title": "A", "views": 12000}, 7, null ],
            "workflow_state": {"selected_platforms": ["抖音", 5, "ig"]}
        });
        let reply = decode_chat_reply(&body);
        assert_eq!(reply.ranking.len(), 1);
        assert_eq!(reply.ranking[0].views, "12000");
        assert_eq!(reply.ranking[0].id, None);
        let wf = reply.workflow.expect("workflow");
        assert_eq!(wf.selected_platforms, vec!["抖音", "ig"]);
        assert!(!wf.in_workflow);
    }

    #[test]
    fn test_decode_numeric_string_score() {
        let body = json!({
            "ranking_data": [
                {"title": "A", "score": "95"},
                {"title": "B", "score": " 87.5 "},
                {"title": "C", "score": "高"}
            ]
        });
        let scores: Vec<f64> = decode_chat_reply(&body)
            .ranking
            .iter()
            .map(|e| e.score)
            .collect();
        assert_eq!(scores, vec![95.0, 87.5, 0.0]);
    }

    #[test]
    fn test_decode_non_object_body() {
        assert_eq!(decode_chat_reply(&json!(["response", "x"])), ChatReply::default());
        assert_eq!(decode_chat_reply(&json!("hello")), ChatReply::default());
    }

    #[test]
    fn test_decode_positional_workflow_is_ignored() {
        let body = json!({"workflow_state": ["init", "示例短剧"]});
        assert_eq!(decode_chat_reply(&body).workflow, None);
    }

    #[test]
    fn test_decode_empty_object() {
        assert_eq!(decode_chat_reply(&json!({})), ChatReply::default());
    }

    #[test]
    fn test_chat_request_shape() {
        let body = serde_json::to_value(ChatRequest {
            message: "你好",
            session_id: "default",
        })
        .expect("serialize");
        assert_eq!(body, json!({"message": "你好", "session_id": "default"}));
    }
}
