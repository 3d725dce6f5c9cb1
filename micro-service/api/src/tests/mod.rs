use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use app_completion::{CompletionClient, CompletionService};
use app_config::AppConfig;
use app_error::{AppError, AppResult};

use crate::{
    create_routes, handlers::chat::MEDICAL_DISCLAIMER, service::AuthService, state::AppState,
};

struct StubClient;

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, user_message: &str) -> AppResult<String> {
        Ok(format!("About '{}': rest and fluids.", user_message))
    }
}

struct FailingClient;

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _user_message: &str) -> AppResult<String> {
        Err(AppError::provider("Error code: 503 - model overloaded"))
    }
}

fn app_with(completion: CompletionService, config: AppConfig) -> Router {
    let auth_service = Arc::new(AuthService::new(b"test_jwt_secret", 30));
    create_routes(AppState::new(auth_service, completion, Arc::new(config)))
}

fn app(completion: CompletionService) -> Router {
    app_with(completion, AppConfig::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_login(uri: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "grant_type=password&username={}&password={}",
            username, password
        )))
        .unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn chat_request(uri: &str, token: &str, message: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(json!({ "message": message }).to_string()))
        .unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": password,
            }),
        ),
    )
    .await;
    (status, body)
}

async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let (status, _, body) = send(app, form_login("/auth/login", username, password)).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_describes_service() {
    let app = app(CompletionService::disabled());

    let (status, _, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "AI Doctor API", "version": "2.0.0", "status": "production" })
    );
}

#[tokio::test]
async fn test_health_reports_provider_state() {
    let (_, _, body) = send(&app(CompletionService::disabled()), get("/health", None)).await;
    assert_eq!(body, json!({ "status": "healthy", "groq": "not configured" }));

    let configured = CompletionService::with_client(Arc::new(StubClient));
    let (status, _, body) = send(&app(configured), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groq"], "connected");
}

#[tokio::test]
async fn test_responses_carry_security_and_request_id_headers() {
    let (_, headers, _) = send(&app(CompletionService::disabled()), get("/health", None)).await;

    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_register_returns_profile_without_hash() {
    let app = app(CompletionService::disabled());

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "secret",
                "full_name": "Alice Liddell",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "username": "alice", "email": "alice@example.com", "full_name": "Alice Liddell" })
    );
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let app = app(CompletionService::disabled());

    let (first, _) = register(&app, "alice", "pw").await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) = register(&app, "alice", "other").await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Username already exists");
}

#[tokio::test]
async fn test_register_rejects_malformed_input() {
    let app = app(CompletionService::disabled());

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "username": "alice", "email": "nope", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _, _) = send(
        &app,
        json_request("POST", "/auth/register", json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = app(CompletionService::disabled());
    register(&app, "alice", "pw123").await;

    for (username, password) in [("alice", "wrong"), ("nobody", "pw123")] {
        let (status, headers, body) = send(&app, form_login("/auth/login", username, password)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Incorrect credentials");
        assert!(body.get("access_token").is_none());
        assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}

#[tokio::test]
async fn test_login_accepts_json_credentials() {
    let app = app(CompletionService::disabled());
    register(&app, "alice", "pw123").await;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": "alice", "password": "pw123" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some());
}

fn multipart_login(uri: &str, username: &str, password: &str) -> Request<Body> {
    let body = format!(
        "--XB\r\n\
         Content-Disposition: form-data; name=\"username\"\r\n\r\n{}\r\n\
         --XB\r\n\
         Content-Disposition: form-data; name=\"password\"\r\n\r\n{}\r\n\
         --XB\r\n\
         Content-Disposition: form-data; name=\"grant_type\"\r\n\r\npassword\r\n\
         --XB--\r\n",
        username, password
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XB")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_login_accepts_multipart_form() {
    let app = app(CompletionService::disabled());
    register(&app, "bob", "pw123").await;

    let (status, _, body) = send(&app, multipart_login("/api/v1/auth/login", "bob", "pw123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");

    let token = body["access_token"].as_str().unwrap();
    let (status, _, me) = send(&app, get("/auth/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "bob");

    let (status, _, body) = send(&app, multipart_login("/auth/login", "bob", "wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect credentials");
}

#[tokio::test]
async fn test_multipart_login_requires_both_fields() {
    let app = app(CompletionService::disabled());

    let body = "--XB\r\nContent-Disposition: form-data; name=\"username\"\r\n\r\nbob\r\n--XB--\r\n";
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XB")
        .body(Body::from(body))
        .unwrap();

    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let app = app(CompletionService::disabled());

    let (status, _) = register(&app, "bob", "pw123").await;
    assert_eq!(status, StatusCode::OK);

    let token = login_token(&app, "bob", "pw123").await;

    let (status, _, body) = send(&app, get("/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "bob");
    assert!(body.get("password_hash").is_none());

    let (status, headers, body) = send(&app, get("/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Not authenticated");
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn test_me_rejects_garbage_token() {
    let app = app(CompletionService::disabled());

    let (status, _, body) = send(&app, get("/auth/me", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_chat_requires_authentication() {
    let app = app(CompletionService::with_client(Arc::new(StubClient)));

    let (status, _, _) = send(
        &app,
        json_request("POST", "/chat", json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chat_without_provider_is_unavailable() {
    let app = app(CompletionService::disabled());
    register(&app, "bob", "pw123").await;
    let token = login_token(&app, "bob", "pw123").await;

    let (status, _, body) = send(&app, chat_request("/chat", &token, "hello")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "AI service not configured");
}

#[tokio::test]
async fn test_chat_appends_disclaimer() {
    let app = app(CompletionService::with_client(Arc::new(StubClient)));
    register(&app, "bob", "pw123").await;
    let token = login_token(&app, "bob", "pw123").await;

    let (status, _, body) = send(&app, chat_request("/chat", &token, "a cold")).await;
    assert_eq!(status, StatusCode::OK);

    let reply = body["response"].as_str().unwrap();
    assert_eq!(
        reply,
        format!("About 'a cold': rest and fluids.{}", MEDICAL_DISCLAIMER)
    );
}

#[tokio::test]
async fn test_chat_surfaces_provider_errors() {
    let app = app(CompletionService::with_client(Arc::new(FailingClient)));
    register(&app, "bob", "pw123").await;
    let token = login_token(&app, "bob", "pw123").await;

    let (status, _, body) = send(&app, chat_request("/chat", &token, "hello")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "AI error: Error code: 503 - model overloaded");
}

#[tokio::test]
async fn test_routes_are_mounted_under_api_prefix() {
    let app = app(CompletionService::with_client(Arc::new(StubClient)));

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            json!({ "username": "carol", "email": "carol@example.com", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Prefixed and unprefixed routes share one store
    let token = login_token(&app, "carol", "pw").await;
    let (status, _, body) = send(&app, get("/api/v1/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carol");

    let (status, _, _) = send(&app, chat_request("/api/v1/chat", &token, "hi")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _, body) = send(&app(CompletionService::disabled()), get("/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_oversized_body_is_rejected_as_json() {
    let mut config = AppConfig::default();
    config.server.body_limit = 64;
    let app = app_with(CompletionService::disabled(), config);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({
                "username": "x".repeat(200),
                "email": "x@example.com",
                "password": "pw",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}
