//! Conversation store: ordered, append-only log of chat turns.

use crate::domain::{Message, Role};
use chrono::Utc;

/// Agent label and text of the first assistant turn in every workspace.
pub const GREETING_AGENT: &str = "北斗AI助手";
pub const GREETING_TEXT: &str =
    "你好！我是北斗AI短剧推广助手。我可以帮你查看今日热门短剧排行榜，并协助你制作推广视频。\n\n请问需要我做什么？";

/// Append-only message log. Ids are unique and strictly increasing.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the assistant greeting.
    pub fn with_greeting() -> Self {
        let mut store = Self::new();
        store.push_assistant(Some(GREETING_AGENT), GREETING_TEXT);
        store
    }

    pub fn append(&mut self, role: Role, agent_label: Option<&str>, text: impl Into<String>) -> &Message {
        self.next_id += 1;
        self.messages.push(Message {
            id: self.next_id,
            role,
            agent_label: agent_label.map(str::to_string),
            text: text.into(),
            created_at: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &Message {
        self.append(Role::User, None, text)
    }

    pub fn push_assistant(&mut self, agent_label: Option<&str>, text: impl Into<String>) -> &Message {
        self.append(Role::Assistant, agent_label, text)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages appended after the one with id `after` (all when `after` is 0).
    pub fn since(&self, after: u64) -> &[Message] {
        let start = self.messages.partition_point(|m| m.id <= after);
        &self.messages[start..]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
