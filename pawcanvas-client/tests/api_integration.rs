//! Backend client against a mock server.

use std::sync::Arc;

use pawcanvas_client::{
    ApiClient, ClientConfig, ClientError, MemoryTokenStore, SessionTokens, SignupRequest,
    TokenStore,
};
use pawcanvas_core::{DocumentSnapshot, EditMetadata, Filter, Size};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, store: &MemoryTokenStore) -> ApiClient {
    let config = ClientConfig::new(&server.uri()).expect("config");
    ApiClient::new(config, Arc::new(store.clone())).expect("client")
}

fn logged_in(access: &str) -> MemoryTokenStore {
    MemoryTokenStore::with_tokens(SessionTokens::new(access, "r1"))
}

fn metadata() -> EditMetadata {
    EditMetadata {
        filters: Some(Filter::Sepia),
        objects: DocumentSnapshot {
            surface: Size::new(600.0, 600.0),
            background: "#ffffff".to_string(),
            objects: Vec::new(),
        },
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_login_stores_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"email": "rex@example.com", "password": "woofwoof1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    let api = client(&server, &store);
    let tokens = api.login("rex@example.com", "woofwoof1").await.expect("login");

    assert_eq!(tokens, SessionTokens::new("a1", "r1"));
    assert_eq!(store.tokens(), Some(tokens));
    assert!(api.is_authenticated());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_login_rejection_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    let err = client(&server, &store)
        .login("rex@example.com", "nope")
        .await
        .expect_err("rejected");

    match err {
        ClientError::Unauthorized(detail) => {
            assert_eq!(detail, "No active account found with the given credentials");
        }
        other => panic!("Expected Unauthorized, got: {other:?}"),
    }
    assert!(store.tokens().is_none());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_signup_validates_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    let request = SignupRequest {
        username: "rex".to_string(),
        email: "rex@example.com".to_string(),
        password: "password".to_string(),
        confirm_password: "password".to_string(),
    };
    let err = client(&server, &store)
        .signup(&request)
        .await
        .expect_err("weak password");
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_signup_posts_form_and_stores_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup/"))
        .and(body_json(json!({
            "username": "rex",
            "email": "rex@example.com",
            "password": "woofwoof1",
            "confirm_password": "woofwoof1"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"access": "a9", "refresh": "r9"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    let request = SignupRequest {
        username: "rex".to_string(),
        email: "rex@example.com".to_string(),
        password: "woofwoof1".to_string(),
        confirm_password: "woofwoof1".to_string(),
    };
    client(&server, &store).signup(&request).await.expect("signup");
    assert_eq!(store.tokens(), Some(SessionTokens::new("a9", "r9")));
}

// ============================================================================
// Token refresh
// ============================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_expired_access_refreshes_and_retries_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/edited-pet-images/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/edited-pet-images/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "edited_image_url": "/media/edits/7.png", "edit_metadata": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in("stale");
    let edits = client(&server, &store).list_edits().await.expect("list");

    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].id, 7);
    assert!(edits[0].edit_metadata.is_none());
    assert_eq!(store.tokens(), Some(SessionTokens::new("fresh", "r1")));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_second_unauthorized_is_not_retried_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/edited-pet-images/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "nope"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in("stale");
    let err = client(&server, &store)
        .list_edits()
        .await
        .expect_err("still unauthorized");
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_rejected_refresh_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/edited-pet-images/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .mount(&server)
        .await;

    let store = logged_in("stale");
    match client(&server, &store).list_edits().await {
        Err(ClientError::Unauthorized(detail)) => {
            assert_eq!(detail, "Token is invalid or expired");
        }
        other => panic!("Expected Unauthorized, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_requests_need_a_session() {
    let config = ClientConfig::new("http://127.0.0.1:9").expect("config");
    let api = ApiClient::new(config, Arc::new(MemoryTokenStore::new())).expect("client");
    assert!(matches!(
        api.list_edits().await,
        Err(ClientError::NotAuthenticated)
    ));
    assert!(matches!(
        api.refresh_access().await,
        Err(ClientError::NotAuthenticated)
    ));
}

// ============================================================================
// Saved edits
// ============================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_list_rejects_non_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/edited-pet-images/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let store = logged_in("a1");
    let err = client(&server, &store)
        .list_edits()
        .await
        .expect_err("html");
    assert!(matches!(err, ClientError::UnexpectedResponse(_)));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_save_posts_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/edited-pet-images/"))
        .and(header("authorization", "Bearer a1"))
        .and(body_string_contains("name=\"edited_image\""))
        .and(body_string_contains("filename=\"edited-pet-image.png\""))
        .and(body_string_contains("name=\"edit_metadata\""))
        .and(body_string_contains("\"filters\""))
        .and(body_string_contains("fake-png-bytes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 12,
            "edited_image_url": "http://cdn.example/edits/12.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in("a1");
    let saved = client(&server, &store)
        .save_edit(b"fake-png-bytes".to_vec(), &metadata())
        .await
        .expect("save")
        .expect("record");
    assert_eq!(saved.id, 12);
    assert_eq!(saved.edited_image_url, "http://cdn.example/edits/12.png");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_save_failure_surfaces_detail_or_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/edited-pet-images/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Image too large"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/edited-pet-images/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = logged_in("a1");
    let api = client(&server, &store);

    match api.save_edit(b"x".to_vec(), &metadata()).await {
        Err(ClientError::Api { status, detail }) => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Image too large");
        }
        other => panic!("Expected Api error, got: {other:?}"),
    }
    match api.save_edit(b"x".to_vec(), &metadata()).await {
        Err(ClientError::Api { status, detail }) => {
            assert_eq!(status, 500);
            assert_eq!(detail, "Failed to save edited image");
        }
        other => panic!("Expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_fetch_image_resolves_relative_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media/edits/7.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    let api = client(&server, &store);
    assert_eq!(
        api.fetch_image("/media/edits/7.png").await.expect("fetch"),
        vec![1, 2, 3]
    );
    assert!(matches!(
        api.fetch_image("/media/missing.png").await,
        Err(ClientError::Api { status: 404, .. })
    ));
}
