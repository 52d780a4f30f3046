//! Integration tests for the HTTP client functionality.
//!
//! These tests verify the client configuration, request building, bearer
//! header handling, response parsing, and error handling behavior.

use std::sync::Arc;

use a1french_api::clients::{HttpClient, HttpMethod, HttpRequest, ReauthClient, REFRESH_PATH};
use a1french_api::{
    ApiBaseUrl, ClientConfig, HttpError, InvalidHttpRequestError, TokenPair,
    TokenStore,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(uri: &str) -> ClientConfig {
    ClientConfig::builder()
        .base_url(ApiBaseUrl::new(uri).unwrap())
        .user_agent_prefix("TestApp/1.0")
        .build()
        .unwrap()
}

fn tokens_with(access: &str, refresh: &str) -> Arc<TokenStore> {
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set(&TokenPair::new(access, refresh)).unwrap();
    tokens
}

// ============================================================================
// Request Dispatch
// ============================================================================

#[tokio::test]
async fn test_authenticated_request_carries_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(header("Authorization", "Bearer T1"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server.uri()), tokens_with("T1", "R1")).unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "/api/courses")
        .requires_auth(true)
        .build()
        .unwrap();

    let response = client.request(&request).await.unwrap();
    assert_eq!(response.code, 200);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_public_request_omits_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login/email"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login/email"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"email": "a@b.com", "password": "Secret12"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server.uri()), tokens_with("T1", "R1")).unwrap();
    let request = HttpRequest::builder(HttpMethod::Post, "/api/login/email")
        .body(json!({"email": "a@b.com", "password": "Secret12"}))
        .build()
        .unwrap();

    let response = client.request(&request).await.unwrap();
    assert!(response.is_ok());
}

#[tokio::test]
async fn test_query_params_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("course_id", "c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        HttpClient::new(&config_for(&server.uri()), Arc::new(TokenStore::in_memory())).unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "/api/reviews")
        .query_param("course_id", "c-1")
        .requires_auth(true)
        .build()
        .unwrap();

    client.request(&request).await.unwrap();
}

// ============================================================================
// Responses and Errors
// ============================================================================

#[tokio::test]
async fn test_plain_text_error_body_becomes_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses/nope"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("Course not found\n"),
        )
        .mount(&server)
        .await;

    let client =
        HttpClient::new(&config_for(&server.uri()), Arc::new(TokenStore::in_memory())).unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "/api/courses/nope")
        .build()
        .unwrap();

    match client.request(&request).await.unwrap_err() {
        HttpError::Response(e) => {
            assert_eq!(e.code, 404);
            assert_eq!(e.message, "Course not found");
        }
        other => panic!("expected response error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_json_error_body_becomes_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"error": "Email already exists"})),
        )
        .mount(&server)
        .await;

    let client =
        HttpClient::new(&config_for(&server.uri()), Arc::new(TokenStore::in_memory())).unwrap();
    let request = HttpRequest::builder(HttpMethod::Post, "/api/signup")
        .body(json!({}))
        .build()
        .unwrap();

    let err = client.request(&request).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "Email already exists (status 409)");
}

#[tokio::test]
async fn test_empty_success_body_is_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server.uri()), tokens_with("T1", "R1")).unwrap();
    let request = HttpRequest::builder(HttpMethod::Delete, "/api/cart")
        .requires_auth(true)
        .build()
        .unwrap();

    let response = client.request(&request).await.unwrap();
    assert_eq!(response.code, 204);
    assert_eq!(response.body, json!({}));
}

#[tokio::test]
async fn test_base_client_never_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tokens = tokens_with("T1", "R1");
    let client = HttpClient::new(&config_for(&server.uri()), Arc::clone(&tokens)).unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "/api/cart")
        .requires_auth(true)
        .build()
        .unwrap();

    let err = client.request(&request).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(tokens.access_token().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_reauth_client_passes_public_requests_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login/email"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ReauthClient::new(
        HttpClient::new(&config_for(&server.uri()), tokens_with("T1", "R1")).unwrap(),
    );
    let request = HttpRequest::builder(HttpMethod::Post, "/api/login/email")
        .body(json!({"email": "a@b.com", "password": "bad"}))
        .build()
        .unwrap();

    let err = client.request(&request).await.unwrap_err();
    assert!(err.to_string().contains("Invalid credentials"));
}

// ============================================================================
// Configuration and Building
// ============================================================================

#[test]
fn test_client_default_headers() {
    let client = HttpClient::new(
        &config_for("https://api.example.com"),
        Arc::new(TokenStore::in_memory()),
    )
    .unwrap();

    let headers = client.default_headers();

    let user_agent = headers.get("User-Agent").unwrap();
    assert!(user_agent.starts_with("TestApp/1.0 | "));
    assert!(user_agent.contains("A1 French API Library"));
    assert!(user_agent.contains("Rust"));

    assert_eq!(headers.get("Accept"), Some(&"application/json".to_string()));
    assert!(!headers.contains_key("Authorization"));
    assert_eq!(client.base_url().as_ref(), "https://api.example.com");
}

#[test]
fn test_invalid_request_produces_correct_error() {
    let result = HttpRequest::builder(HttpMethod::Put, "/api/user/me").build();
    assert!(matches!(
        result,
        Err(InvalidHttpRequestError::MissingBody { .. })
    ));

    let result = HttpRequest::builder(HttpMethod::Delete, "/api/cart").build();
    assert!(result.is_ok());
}

#[test]
fn test_request_builder_chaining() {
    let request = HttpRequest::builder(HttpMethod::Get, "/api/reviews")
        .query_param("course_id", "c-1")
        .requires_auth(true)
        .build()
        .unwrap();

    let query = request.query.unwrap();
    assert_eq!(query.get("course_id"), Some(&"c-1".to_string()));

    assert!(request.requires_auth);
}

#[tokio::test]
async fn test_response_headers_are_keyed_lowercase() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Course-Count", "0"),
        )
        .mount(&server)
        .await;

    let client =
        HttpClient::new(&config_for(&server.uri()), Arc::new(TokenStore::in_memory())).unwrap();
    let request = HttpRequest::builder(HttpMethod::Get, "/api/courses")
        .build()
        .unwrap();

    let response = client.request(&request).await.unwrap();
    assert_eq!(
        response.headers.get("x-course-count"),
        Some(&vec!["0".to_string()])
    );
    assert!(!response.headers.contains_key("X-Course-Count"));
}

#[test]
fn test_http_method_display() {
    assert_eq!(HttpMethod::Get.to_string(), "get");
    assert_eq!(HttpMethod::Post.to_string(), "post");
    assert_eq!(HttpMethod::Put.to_string(), "put");
    assert_eq!(HttpMethod::Delete.to_string(), "delete");
}
