use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Citation attached to an assistant answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            role: Role::User,
            content: content.into(),
            timestamp: display_time_now(),
            sources: None,
        }
    }
}

/// A chat thread. Negative ids live in the guest store, positive ids on the
/// server; the two partitions never mix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn is_guest(&self) -> bool {
        self.id < 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub is_active: bool,
}

/// A support program entry ("policy"), read-only reference data.
#[derive(Clone, Debug, PartialEq)]
pub struct Policy {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub question: String,
    pub answer: String,
    pub order: i32,
    pub detail_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
}

impl Identity {
    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }
}

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn next_message_id() -> String {
    format!("m{}", MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed))
}

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

const DATETIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

fn local_now() -> OffsetDateTime {
    let mut now = OffsetDateTime::now_utc();
    if let Ok(offset) = UtcOffset::current_local_offset() {
        now = now.to_offset(offset);
    }
    now
}

/// Short clock time shown next to transcript bubbles.
pub fn display_time_now() -> String {
    local_now().format(MESSAGE_TIME_FORMAT).unwrap_or_default()
}

/// Full timestamp used for conversation created/updated fields.
pub fn display_datetime_now() -> String {
    local_now().format(DATETIME_FORMAT).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_distinct() {
        let a = next_message_id();
        let b = next_message_id();
        assert_ne!(a, b);
    }

    #[test]
    fn guest_partition_follows_id_sign() {
        let guest = Conversation {
            id: -3,
            title: "t".into(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let remote = Conversation { id: 7, ..guest.clone() };
        assert!(guest.is_guest());
        assert!(!remote.is_guest());
    }

    #[test]
    fn sources_are_omitted_when_absent() {
        let msg = ChatMessage::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("sources"));
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sources, None);
    }
}
