use serde_json::json;
use shopchat::api::ApiClient;
use shopchat::auth::AuthSession;
use shopchat::chat::{ChatBackend, EMPTY_REPLY_FALLBACK, TransportError, reply_message};
use shopchat::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY};
use shopchat::session::IdentityKey;
use shopchat::storage::{KeyValueStore, MemoryStore};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api/", server.uri())).unwrap()
}

#[tokio::test]
async fn chat_posts_message_and_reads_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .and(body_json(json!({ "message": "tents under $50" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Try the Trail 2P." })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;
    let reply = api.chat("tents under $50").await.unwrap();
    assert_eq!(reply.reply.as_deref(), Some("Try the Trail 2P."));
}

#[tokio::test]
async fn missing_reply_field_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let msg = reply_message(api.chat("hi").await);
    assert_eq!(msg.content, EMPTY_REPLY_FALLBACK);
}

#[tokio::test]
async fn empty_or_garbled_success_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .and(body_json(json!({ "message": "empty" })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .and(body_json(json!({ "message": "garbled" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let api = client(&server).await;
    assert_eq!(reply_message(api.chat("empty").await).content, EMPTY_REPLY_FALLBACK);
    assert_eq!(reply_message(api.chat("garbled").await).content, EMPTY_REPLY_FALLBACK);
}

#[tokio::test]
async fn access_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;
    api.set_access_token(Some("tok-123".into()));
    assert_eq!(api.chat("hi").await.unwrap().reply.as_deref(), Some("ok"));
}

#[tokio::test]
async fn error_body_is_surfaced_in_transcript_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "message required" })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let result = api.chat("x").await;
    assert!(matches!(result, Err(TransportError::Http { status: 400, .. })));
    let msg = reply_message(result);
    assert_eq!(msg.content, r#"Error: {"detail":"message required"}"#);
}

#[tokio::test]
async fn empty_error_body_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let msg = reply_message(api.chat("x").await);
    assert_eq!(msg.content, "Error: Request failed with status code 502");
}

#[tokio::test]
async fn reset_is_best_effort() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/reset/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;
    let outcome = api.reset().await;
    assert!(!outcome.succeeded());
    outcome.ignore();
}

#[tokio::test]
async fn session_cookie_is_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .and(header("cookie", "sessionid=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "second" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/assistant/chat/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=abc; Path=/")
                .set_body_json(json!({ "reply": "first" })),
        )
        .mount(&server)
        .await;

    let api = client(&server).await;
    assert_eq!(api.chat("one").await.unwrap().reply.as_deref(), Some("first"));
    assert_eq!(api.chat("two").await.unwrap().reply.as_deref(), Some("second"));
}

#[tokio::test]
async fn login_stores_tokens_and_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({ "username": "alice", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })),
        )
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let mut auth = AuthSession::restore(store.clone(), client(&server).await);
    auth.login("alice", "pw").await.unwrap();
    assert_eq!(auth.identity(), IdentityKey::User("alice".into()));
    assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("a1"));
    assert_eq!(store.get(REFRESH_TOKEN_KEY).as_deref(), Some("r1"));
    assert_eq!(store.get(USERNAME_KEY).as_deref(), Some("alice"));
    assert_eq!(auth.api().access_token().as_deref(), Some("a1"));
}

#[tokio::test]
async fn rejected_login_shows_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!("Invalid credentials")),
        )
        .mount(&server)
        .await;

    let mut auth = AuthSession::restore(MemoryStore::new(), client(&server).await);
    let err = auth.login("alice", "bad").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(auth.identity(), IdentityKey::Guest);
}

#[tokio::test]
async fn register_then_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .and(body_json(json!({ "username": "bob", "email": "b@x.io", "password": "pw" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "a", "refresh": "r" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = AuthSession::restore(MemoryStore::new(), client(&server).await);
    auth.register("bob", "b@x.io", "pw").await.unwrap();
    assert_eq!(auth.user(), Some("bob"));
}
