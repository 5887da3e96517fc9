use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use youth_compass::api::client::UserUpdateRequest;
use youth_compass::api::{
    ApiClient, ApiError, SendMessageRequest, TranscriptUpdate, USER_ID_HEADER, stream_chat,
};
use youth_compass::config::ApiConfig;
use youth_compass::session::SessionStore;
use youth_compass::storage::EphemeralStore;
use youth_compass::types::Role;

fn client_for(server_uri: &str, logged_in: bool) -> ApiClient {
    let session = Arc::new(SessionStore::new(Arc::new(EphemeralStore::default())));
    if logged_in {
        session.login(7, "Alex").unwrap();
    }
    let config = ApiConfig {
        base_url: server_uri.trim_end_matches('/').to_string(),
    };
    ApiClient::new(&config, session)
}

#[tokio::test]
async fn authenticated_call_without_login_never_reaches_the_network() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), false);

    let result = client.conversations().await;
    assert!(matches!(result, Err(ApiError::AuthRequired)));

    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty());
}

#[tokio::test]
async fn missing_conversation_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat/history/5"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such conversation"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), true);
    let result = client.chat_history(5).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn delete_accepts_an_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/conversations/5"))
        .and(header(USER_ID_HEADER, "7"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), true);
    client.delete_conversation(5).await.unwrap();
}

#[tokio::test]
async fn blank_success_bodies_decode_as_an_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/plain"))
        .mount(&server)
        .await;

    let response = reqwest::get(format!("{}/ping", server.uri())).await.unwrap();
    let value: serde_json::Value = youth_compass::api::client::decode_response(response)
        .await
        .unwrap();
    assert_eq!(value, serde_json::json!({}));
}

#[tokio::test]
async fn history_parses_the_embedded_sources_column() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        {
            "messageId": 1,
            "messageContent": "what housing support exists?",
            "messageRole": "USER",
            "messageCreatedAt": "2026-08-01 10:00:00"
        },
        {
            "messageId": 2,
            "messageContent": "Several programs apply.",
            "messageRole": "ASSISTANT",
            "messageCreatedAt": "2026-08-01 10:00:05",
            "messageSources": "[{\"title\":\"Housing Fund\",\"url\":\"https://example.org/h\",\"score\":0.9}]"
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/chat/history/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), true);
    let history = client.chat_history(3).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].sources, None);
    let sources = history[1].sources.as_ref().unwrap();
    assert_eq!(sources[0].title, "Housing Fund");
}

#[tokio::test]
async fn profile_update_sends_salary_and_assets() {
    let server = MockServer::start().await;
    let expected = serde_json::json!({
        "userName": "Jun",
        "userSalary": 32_000_000i64,
        "userAssets": 50_000_000i64
    });
    let body = serde_json::json!({
        "userId": 7,
        "userLoginId": "jun01",
        "userName": "Jun",
        "userSalary": 32_000_000i64,
        "userAssets": 50_000_000i64
    });
    Mock::given(method("PUT"))
        .and(path("/users/7"))
        .and(header(USER_ID_HEADER, "7"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), true);
    let request = UserUpdateRequest {
        user_name: Some("Jun".to_string()),
        user_salary: Some(32_000_000),
        user_assets: Some(50_000_000),
        ..UserUpdateRequest::default()
    };
    let user = client.update_user(7, &request).await.unwrap();
    assert_eq!(user.user_salary, Some(32_000_000));
    assert_eq!(user.user_assets, Some(50_000_000));
}

#[tokio::test]
async fn negative_ids_never_leave_the_process() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), true);

    let result = client.chat_history(-4).await;
    assert!(matches!(result, Err(ApiError::InvalidConversationId(-4))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn keyword_search_maps_the_faq_contract() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        {
            "faqId": 11,
            "categoryId": 2,
            "categoryName": "Housing",
            "faqQuestion": "Monthly rent support?",
            "faqAnswer": "Up to 200k a month for one year.",
            "faqOrder": 1,
            "faqDetailUrl": "https://example.org/rent"
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/faq/search"))
        .and(query_param("keyword", "rent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), false);
    let policies = client.search_faqs("rent").await.unwrap();
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0].category_name, "Housing");
    assert_eq!(policies[0].detail_url, "https://example.org/rent");
}

#[tokio::test]
async fn streaming_chat_folds_content_and_sources() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"type\":\"session\",\"sessionId\":\"s1\"}\n\n",
        "data: {\"type\":\"content\",\"content\":\"Hello \"}\n\n",
        "data: {\"type\":\"content\",\"content\":\"world\"}\n\n",
        "data: {\"type\":\"sources\",\"sources\":[{\"title\":\"Youth Portal\",\"url\":\"https://example.org\",\"score\":0.8}]}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/stream"))
        .and(header(USER_ID_HEADER, "7"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), true);
    let request = SendMessageRequest {
        conversation_id: Some(3),
        message: "hi".to_string(),
    };

    let mut updates = Vec::new();
    let outcome = stream_chat(&client, &request, |update| updates.push(update))
        .await
        .unwrap();

    assert_eq!(outcome.content, "Hello world");
    assert_eq!(outcome.sources.as_ref().unwrap().len(), 1);

    let begins = updates
        .iter()
        .filter(|u| matches!(u, TranscriptUpdate::Begin(_)))
        .count();
    assert_eq!(begins, 1);
    match updates.first().unwrap() {
        TranscriptUpdate::Begin(message) => {
            assert_eq!(message.role, Role::Assistant);
            assert_eq!(message.content, "Hello ");
        }
        other => panic!("expected Begin first, got {:?}", other),
    }
    match updates.last().unwrap() {
        TranscriptUpdate::Revise { content, sources } => {
            assert_eq!(content, "Hello world");
            assert_eq!(sources.as_ref().unwrap()[0].title, "Youth Portal");
        }
        other => panic!("expected a final Revise, got {:?}", other),
    }
}

#[tokio::test]
async fn guest_stream_carries_no_identity_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("data: {\"type\":\"content\",\"content\":\"ok\"}\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), false);
    let request = SendMessageRequest {
        conversation_id: None,
        message: "hi".to_string(),
    };
    let outcome = stream_chat(&client, &request, |_| {}).await.unwrap();
    assert_eq!(outcome.content, "ok");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("user-id"));
}
