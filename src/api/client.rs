use crate::api::error::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::session::SessionStore;
use crate::types::{Category, ChatMessage, Conversation, Policy, Role, Source};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Header carrying the session identifier on authenticated endpoints.
pub const USER_ID_HEADER: &str = "User-Id";

// ============================================
// Wire types (camelCase contract of the backend)
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub conversation_id: i64,
    pub conversation_title: String,
    pub conversation_created_at: String,
    pub conversation_updated_at: String,
}

impl From<ConversationResponse> for Conversation {
    fn from(value: ConversationResponse) -> Self {
        Conversation {
            id: value.conversation_id,
            title: value.conversation_title,
            created_at: value.conversation_created_at,
            updated_at: value.conversation_updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub message_id: i64,
    pub message_content: String,
    pub message_role: String,
    pub message_created_at: String,
    /// JSON-encoded citation list, or absent.
    #[serde(default)]
    pub message_sources: Option<String>,
}

impl ChatMessageResponse {
    pub fn into_message(self) -> ChatMessage {
        let role = if self.message_role.eq_ignore_ascii_case("user") {
            Role::User
        } else {
            Role::Assistant
        };
        let sources = self.message_sources.as_deref().and_then(|raw| {
            match serde_json::from_str::<Vec<Source>>(raw) {
                Ok(list) if list.is_empty() => None,
                Ok(list) => Some(list),
                Err(err) => {
                    warn!(message_id = self.message_id, error = %err, "unreadable sources field");
                    None
                }
            }
        });
        ChatMessage {
            id: self.message_id.to_string(),
            role,
            content: self.message_content,
            timestamp: self.message_created_at,
            sources,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Absent for a guest exchange; never negative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub conversation_id: i64,
    pub user_message: ChatMessageResponse,
    pub ai_message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationHistoryResponse {
    pub conversation: ConversationResponse,
    pub messages: Vec<ChatMessageResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateConversationRequest<'a> {
    conversation_title: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub category_id: i64,
    pub category_name: String,
    #[serde(default)]
    pub category_icon: String,
    pub category_is_active: bool,
}

impl From<CategoryResponse> for Category {
    fn from(value: CategoryResponse) -> Self {
        Category {
            id: value.category_id,
            name: value.category_name,
            icon: value.category_icon,
            is_active: value.category_is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqResponse {
    pub faq_id: i64,
    pub category_id: i64,
    #[serde(default)]
    pub category_name: String,
    pub faq_question: String,
    pub faq_answer: String,
    #[serde(default)]
    pub faq_order: i32,
    #[serde(default)]
    pub faq_detail_url: String,
}

impl From<FaqResponse> for Policy {
    fn from(value: FaqResponse) -> Self {
        Policy {
            id: value.faq_id,
            category_id: value.category_id,
            category_name: value.category_name,
            question: value.faq_question,
            answer: value.faq_answer,
            order: value.faq_order,
            detail_url: value.faq_detail_url,
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegisterRequest {
    pub user_login_id: String,
    pub user_password: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_residence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_salary: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_assets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agree_privacy: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginRequest {
    pub user_login_id: String,
    pub user_password: String,
}

/// Partial update; only present fields are sent.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_residence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_salary: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_assets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub user_login_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_residence: Option<String>,
    #[serde(default)]
    pub user_age: Option<i32>,
    #[serde(default)]
    pub user_salary: Option<i64>,
    #[serde(default)]
    pub user_assets: Option<i64>,
    #[serde(default)]
    pub user_note: Option<String>,
}

// ============================================
// Client
// ============================================

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            session,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a request; authenticated ones fail fast when nobody is logged
    /// in, before any network I/O.
    fn request(&self, method: Method, path: &str, authenticated: bool) -> ApiResult<RequestBuilder> {
        let mut builder = self.http.request(method, self.endpoint(path));
        if authenticated {
            let user_id = self.session.current().user_id.ok_or(ApiError::AuthRequired)?;
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        Ok(builder)
    }

    // ----- users -----

    pub async fn register(&self, request: &UserRegisterRequest) -> ApiResult<UserResponse> {
        let builder = self.request(Method::POST, "/users/register", false)?;
        execute(builder.json(request)).await
    }

    pub async fn login(&self, request: &UserLoginRequest) -> ApiResult<UserResponse> {
        let builder = self.request(Method::POST, "/users/login", false)?;
        execute(builder.json(request)).await
    }

    pub async fn user_info(&self, user_id: i64) -> ApiResult<UserResponse> {
        let builder = self.request(Method::GET, &format!("/users/{user_id}"), true)?;
        execute(builder).await
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        request: &UserUpdateRequest,
    ) -> ApiResult<UserResponse> {
        let builder = self.request(Method::PUT, &format!("/users/{user_id}"), true)?;
        execute(builder.json(request)).await
    }

    // ----- chat -----

    pub async fn send_message(&self, request: &SendMessageRequest) -> ApiResult<SendMessageResponse> {
        guard_remote_id(request.conversation_id)?;
        let builder = self.request(Method::POST, "/chat", true)?;
        execute(builder.json(request)).await
    }

    pub async fn chat_history(&self, conversation_id: i64) -> ApiResult<Vec<ChatMessage>> {
        guard_remote_id(Some(conversation_id))?;
        let builder = self.request(
            Method::GET,
            &format!("/chat/history/{conversation_id}"),
            true,
        )?;
        let messages: Vec<ChatMessageResponse> = execute(builder).await?;
        Ok(messages.into_iter().map(|m| m.into_message()).collect())
    }

    /// Open the streaming chat endpoint and hand back the raw response for
    /// the assembler. The identity header rides along when someone is logged
    /// in; guests stream without it (and without a conversation id).
    pub async fn open_chat_stream(&self, request: &SendMessageRequest) -> ApiResult<Response> {
        guard_remote_id(request.conversation_id)?;
        let mut builder = self
            .http
            .post(self.endpoint("/chat/stream"))
            .header("accept", "text/event-stream");
        if let Some(user_id) = self.session.current().user_id {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        let response = builder.json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }
        debug!(conversation_id = ?request.conversation_id, "chat stream opened");
        Ok(response)
    }

    // ----- conversations -----

    pub async fn create_conversation(&self, title: &str) -> ApiResult<Conversation> {
        let builder = self.request(Method::POST, "/conversations", true)?;
        let created: ConversationResponse = execute(
            builder.json(&CreateConversationRequest {
                conversation_title: title,
            }),
        )
        .await?;
        Ok(created.into())
    }

    pub async fn conversations(&self) -> ApiResult<Vec<Conversation>> {
        let builder = self.request(Method::GET, "/conversations", true)?;
        let listing: Vec<ConversationResponse> = execute(builder).await?;
        Ok(listing.into_iter().map(Conversation::from).collect())
    }

    pub async fn conversation_history(
        &self,
        conversation_id: i64,
    ) -> ApiResult<(Conversation, Vec<ChatMessage>)> {
        guard_remote_id(Some(conversation_id))?;
        let builder = self.request(
            Method::GET,
            &format!("/conversations/{conversation_id}"),
            true,
        )?;
        let history: ConversationHistoryResponse = execute(builder).await?;
        let messages = history
            .messages
            .into_iter()
            .map(|m| m.into_message())
            .collect();
        Ok((history.conversation.into(), messages))
    }

    pub async fn delete_conversation(&self, conversation_id: i64) -> ApiResult<()> {
        guard_remote_id(Some(conversation_id))?;
        let builder = self.request(
            Method::DELETE,
            &format!("/conversations/{conversation_id}"),
            true,
        )?;
        execute_empty(builder).await
    }

    // ----- catalog (public reference data) -----

    pub async fn active_categories(&self) -> ApiResult<Vec<Category>> {
        let builder = self.request(Method::GET, "/faq/categories", false)?;
        let listing: Vec<CategoryResponse> = execute(builder).await?;
        Ok(listing.into_iter().map(Category::from).collect())
    }

    pub async fn faqs_by_category(&self, category_id: i64) -> ApiResult<Vec<Policy>> {
        let builder = self.request(
            Method::GET,
            &format!("/faq/categories/{category_id}"),
            false,
        )?;
        let listing: Vec<FaqResponse> = execute(builder).await?;
        Ok(listing.into_iter().map(Policy::from).collect())
    }

    pub async fn search_faqs(&self, keyword: &str) -> ApiResult<Vec<Policy>> {
        let builder = self
            .request(Method::GET, "/faq/search", false)?
            .query(&[("keyword", keyword)]);
        let listing: Vec<FaqResponse> = execute(builder).await?;
        Ok(listing.into_iter().map(Policy::from).collect())
    }

    pub async fn all_faqs(&self) -> ApiResult<Vec<Policy>> {
        let builder = self.request(Method::GET, "/faq", false)?;
        let listing: Vec<FaqResponse> = execute(builder).await?;
        Ok(listing.into_iter().map(Policy::from).collect())
    }
}

fn guard_remote_id(conversation_id: Option<i64>) -> ApiResult<()> {
    if let Some(id) = conversation_id
        && id < 0
    {
        return Err(ApiError::InvalidConversationId(id));
    }
    Ok(())
}

async fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
    let response = builder.send().await?;
    decode_response(response).await
}

/// Status handling without a body expectation, for DELETE-shaped calls.
async fn execute_empty(builder: RequestBuilder) -> ApiResult<()> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }
}

/// Decode a response the way the backend actually behaves: 204 and
/// zero-length bodies decode as an empty object, non-JSON content with a
/// blank body likewise, anything else non-JSON is a decode error rather
/// than a crash.
pub async fn decode_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, body));
    }
    if status == StatusCode::NO_CONTENT {
        return decode_empty();
    }

    let declared_length = response.content_length();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);

    let body = response.text().await?;
    if declared_length == Some(0) || body.trim().is_empty() {
        return decode_empty();
    }
    if !is_json {
        return Err(ApiError::Decode(format!(
            "expected JSON, got: {}",
            truncate_for_log(&body)
        )));
    }
    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn decode_empty<T: DeserializeOwned>() -> ApiResult<T> {
    serde_json::from_str("{}").map_err(|err| ApiError::Decode(err.to_string()))
}

fn status_error(status: StatusCode, body: String) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(body)
    } else {
        ApiError::Status { status, body }
    }
}

fn truncate_for_log(body: &str) -> String {
    body.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_never_reach_the_wire() {
        assert!(matches!(
            guard_remote_id(Some(-1)),
            Err(ApiError::InvalidConversationId(-1))
        ));
        assert!(guard_remote_id(Some(1)).is_ok());
        assert!(guard_remote_id(None).is_ok());
    }

    #[test]
    fn message_response_maps_roles_and_sources() {
        let response = ChatMessageResponse {
            message_id: 9,
            message_content: "Answer".into(),
            message_role: "AI".into(),
            message_created_at: "2025-01-01 10:00:00".into(),
            message_sources: Some(
                r#"[{"title":"Housing Fund","url":"https://fund.example","score":0.92}]"#.into(),
            ),
        };
        let message = response.into_message();
        assert_eq!(message.role, Role::Assistant);
        let sources = message.sources.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Housing Fund");
    }

    #[test]
    fn unreadable_sources_are_dropped_not_fatal() {
        let response = ChatMessageResponse {
            message_id: 1,
            message_content: "x".into(),
            message_role: "USER".into(),
            message_created_at: String::new(),
            message_sources: Some("not json".into()),
        };
        let message = response.into_message();
        assert_eq!(message.role, Role::User);
        assert_eq!(message.sources, None);
    }

    #[test]
    fn guest_request_omits_conversation_id() {
        let request = SendMessageRequest {
            conversation_id: None,
            message: "hi".into(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"message":"hi"}"#);
    }
}
