//! Guest conversation persistence.
//!
//! Unauthenticated users get the same conversation surface as the remote
//! API, backed by the ephemeral per-tab store. Ids are strictly decreasing
//! negatives so they can never collide with server-assigned ids.

use crate::storage::KeyValueStore;
use crate::types::{ChatMessage, Conversation, display_datetime_now};
use std::sync::Arc;
use tracing::warn;

pub const GUEST_INDEX_KEY: &str = "guest_conversations";
/// Title a fresh thread starts with until the first exchange names it.
pub const DEFAULT_TITLE: &str = "New chat";
const TITLE_PREFIX_CHARS: usize = 30;

pub struct GuestConversationStore {
    storage: Arc<dyn KeyValueStore>,
}

impl GuestConversationStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Threads, most recently touched first.
    pub fn list(&self) -> Vec<Conversation> {
        self.read_index()
    }

    pub fn create(&self, title: &str) -> Result<Conversation, String> {
        let mut index = self.read_index();
        let next_id = index.iter().map(|c| c.id).min().unwrap_or(0) - 1;
        let now = display_datetime_now();
        let conversation = Conversation {
            id: next_id,
            title: title.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        index.insert(0, conversation.clone());
        self.write_index(&index)?;
        Ok(conversation)
    }

    pub fn history(&self, id: i64) -> Vec<ChatMessage> {
        let Some(raw) = self.storage.get(&messages_key(id)) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(conversation_id = id, error = %err, "unreadable guest messages");
            Vec::new()
        })
    }

    /// Persist the full message list and move the thread to the front.
    pub fn save_messages(&self, id: i64, messages: &[ChatMessage]) -> Result<(), String> {
        let payload = serde_json::to_string(messages).map_err(|e| e.to_string())?;
        self.storage.set(&messages_key(id), &payload)?;

        let mut index = self.read_index();
        if let Some(pos) = index.iter().position(|c| c.id == id) {
            let mut entry = index.remove(pos);
            entry.updated_at = display_datetime_now();
            index.insert(0, entry);
            self.write_index(&index)?;
        }
        Ok(())
    }

    /// Removes both the message blob and the listing entry.
    pub fn delete(&self, id: i64) -> Result<(), String> {
        self.storage.delete(&messages_key(id))?;
        let mut index = self.read_index();
        index.retain(|c| c.id != id);
        self.write_index(&index)
    }

    /// After the first completed exchange, a thread still carrying the
    /// placeholder title takes its name from the user's opening message.
    pub fn retitle_from_first_message(&self, id: i64, first_message: &str) -> Result<(), String> {
        let mut index = self.read_index();
        let Some(entry) = index.iter_mut().find(|c| c.id == id) else {
            return Ok(());
        };
        if entry.title != DEFAULT_TITLE {
            return Ok(());
        }
        entry.title = title_prefix(first_message);
        self.write_index(&index)
    }

    fn read_index(&self) -> Vec<Conversation> {
        let Some(raw) = self.storage.get(GUEST_INDEX_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "unreadable guest conversation index");
            Vec::new()
        })
    }

    fn write_index(&self, index: &[Conversation]) -> Result<(), String> {
        let payload = serde_json::to_string(index).map_err(|e| e.to_string())?;
        self.storage.set(GUEST_INDEX_KEY, &payload)
    }
}

fn messages_key(id: i64) -> String {
    format!("guest_messages_{}", id.unsigned_abs())
}

/// First 30 characters of the prompt, with a trailing ellipsis when cut.
pub fn title_prefix(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    let mut title: String = trimmed.chars().take(TITLE_PREFIX_CHARS).collect();
    if trimmed.chars().count() > TITLE_PREFIX_CHARS {
        title.push_str("...");
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_pass_through() {
        assert_eq!(title_prefix("rent deposit loans"), "rent deposit loans");
    }

    #[test]
    fn exactly_thirty_chars_is_not_cut() {
        let text = "a".repeat(30);
        assert_eq!(title_prefix(&text), text);
    }

    #[test]
    fn longer_prompts_truncate_by_chars_not_bytes() {
        let text = "청".repeat(31);
        let title = title_prefix(&text);
        assert_eq!(title.chars().count(), 33);
        assert!(title.ends_with("..."));
        assert!(title.starts_with(&"청".repeat(30)));
    }

    #[test]
    fn blank_prompt_keeps_the_placeholder() {
        assert_eq!(title_prefix("   "), DEFAULT_TITLE);
    }
}
