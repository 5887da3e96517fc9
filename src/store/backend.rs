//! One conversation interface, two adapters.
//!
//! The remote API and the guest store expose the same surface; which one a
//! view talks to is decided once per listing by the presence of a login
//! identity. Each adapter rejects ids from the other partition outright.

use crate::api::client::ApiClient;
use crate::api::error::{ApiError, ApiResult};
use crate::store::guest::GuestConversationStore;
use crate::types::{ChatMessage, Conversation, Identity};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ConversationBackend: Send + Sync {
    async fn list(&self) -> ApiResult<Vec<Conversation>>;
    async fn create(&self, title: &str) -> ApiResult<Conversation>;
    async fn history(&self, id: i64) -> ApiResult<Vec<ChatMessage>>;
    async fn save_messages(&self, id: i64, messages: &[ChatMessage]) -> ApiResult<()>;
    async fn delete(&self, id: i64) -> ApiResult<()>;
    /// Hook fired after a thread's first completed exchange.
    async fn apply_default_title(&self, id: i64, first_message: &str) -> ApiResult<()>;
}

pub struct RemoteConversations {
    client: Arc<ApiClient>,
}

impl RemoteConversations {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn guard(id: i64) -> ApiResult<()> {
        if id < 0 {
            return Err(ApiError::InvalidConversationId(id));
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationBackend for RemoteConversations {
    async fn list(&self) -> ApiResult<Vec<Conversation>> {
        self.client.conversations().await
    }

    async fn create(&self, title: &str) -> ApiResult<Conversation> {
        self.client.create_conversation(title).await
    }

    async fn history(&self, id: i64) -> ApiResult<Vec<ChatMessage>> {
        Self::guard(id)?;
        self.client.chat_history(id).await
    }

    async fn save_messages(&self, id: i64, _messages: &[ChatMessage]) -> ApiResult<()> {
        // The server persists both sides of the exchange during the chat
        // call itself.
        Self::guard(id)
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        Self::guard(id)?;
        self.client.delete_conversation(id).await
    }

    async fn apply_default_title(&self, id: i64, _first_message: &str) -> ApiResult<()> {
        // Remote threads are created with their final title up front.
        Self::guard(id)
    }
}

pub struct GuestConversations {
    store: GuestConversationStore,
}

impl GuestConversations {
    pub fn new(store: GuestConversationStore) -> Self {
        Self { store }
    }

    fn guard(id: i64) -> ApiResult<()> {
        if id >= 0 {
            return Err(ApiError::InvalidConversationId(id));
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationBackend for GuestConversations {
    async fn list(&self) -> ApiResult<Vec<Conversation>> {
        Ok(self.store.list())
    }

    async fn create(&self, title: &str) -> ApiResult<Conversation> {
        self.store.create(title).map_err(ApiError::Storage)
    }

    async fn history(&self, id: i64) -> ApiResult<Vec<ChatMessage>> {
        Self::guard(id)?;
        Ok(self.store.history(id))
    }

    async fn save_messages(&self, id: i64, messages: &[ChatMessage]) -> ApiResult<()> {
        Self::guard(id)?;
        self.store.save_messages(id, messages).map_err(ApiError::Storage)
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        Self::guard(id)?;
        self.store.delete(id).map_err(ApiError::Storage)
    }

    async fn apply_default_title(&self, id: i64, first_message: &str) -> ApiResult<()> {
        Self::guard(id)?;
        self.store
            .retitle_from_first_message(id, first_message)
            .map_err(ApiError::Storage)
    }
}

/// Select the storage side for the current identity. The two backends are
/// never combined in one listing.
pub fn backend_for(
    identity: &Identity,
    client: Arc<ApiClient>,
    guest: GuestConversationStore,
) -> Arc<dyn ConversationBackend> {
    if identity.is_logged_in() {
        Arc::new(RemoteConversations::new(client))
    } else {
        Arc::new(GuestConversations::new(guest))
    }
}
