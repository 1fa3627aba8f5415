//! Integration tests for the authenticated request pipeline.
//!
//! Exercises the attach step, the refresh-and-retry-once recovery path, the
//! terminal refresh failure path with its fire-and-forget logout, and the
//! HTTP-backed refresher with token rotation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use procure_api::client::{
    ApiClient, AuthRefresher, ClientError, LogoutHook, TokenRefresher, TokenStore,
};
use serde_json::json;
use tokio::sync::Notify;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Refresher that hands out a fixed token and counts invocations.
struct StaticRefresher {
    token: String,
    calls: AtomicUsize,
}

impl StaticRefresher {
    fn new(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: token.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for StaticRefresher {
    async fn refresh_token(&self) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.clone())
    }
}

/// Refresher whose refresh always fails, as with a revoked refresh token.
struct FailingRefresher {
    calls: AtomicUsize,
}

impl FailingRefresher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for FailingRefresher {
    async fn refresh_token(&self) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClientError::RefreshFailed(
            "refresh token rejected".to_string(),
        ))
    }
}

/// Logout hook that signals a notifier when fired.
struct NotifyLogout {
    notify: Arc<Notify>,
    calls: AtomicUsize,
}

impl NotifyLogout {
    fn new() -> (Arc<Self>, Arc<Notify>) {
        let notify = Arc::new(Notify::new());
        (
            Arc::new(Self {
                notify: notify.clone(),
                calls: AtomicUsize::new(0),
            }),
            notify,
        )
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogoutHook for NotifyLogout {
    async fn logout(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_one();
    }
}

/// Matches requests that carry no Authorization header at all.
struct NoAuthorizationHeader;

impl Match for NoAuthorizationHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn client_with(
    server: &MockServer,
    tokens: TokenStore,
    refresher: Arc<dyn TokenRefresher>,
    logout: Arc<dyn LogoutHook>,
) -> ApiClient {
    ApiClient::with_token_store(server.uri(), tokens, refresher, logout)
        .expect("client builds")
}

// ==================== Attach Step ====================

#[tokio::test]
async fn stored_token_is_attached_as_bearer_credential() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .and(header("authorization", "Bearer seed-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = StaticRefresher::new("unused");
    let (logout, _) = NotifyLogout::new();
    let client = client_with(
        &server,
        TokenStore::with_token("seed-token"),
        refresher.clone(),
        logout,
    );

    let response = client.get("/api/v1/status").await.expect("request succeeds");
    assert_eq!(response.status(), 200);
    assert_eq!(refresher.call_count(), 0, "no refresh for a 200 response");
}

#[tokio::test]
async fn missing_token_sends_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .and(NoAuthorizationHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = StaticRefresher::new("unused");
    let (logout, _) = NotifyLogout::new();
    let client = client_with(&server, TokenStore::new(), refresher, logout);

    let response = client.get("/api/v1/status").await.expect("request succeeds");
    assert_eq!(response.status(), 200);
}

// ==================== Refresh-and-Retry ====================

#[tokio::test]
async fn single_401_refreshes_and_retries_exactly_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vendors"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vendors"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = StaticRefresher::new("fresh-token");
    let (logout, _) = NotifyLogout::new();
    let tokens = TokenStore::with_token("stale-token");
    let client = client_with(&server, tokens.clone(), refresher.clone(), logout.clone());

    let response = client.get("/api/v1/vendors").await.expect("request succeeds");

    assert_eq!(response.status(), 200);
    assert_eq!(refresher.call_count(), 1, "exactly one refresh");
    assert_eq!(logout.call_count(), 0, "no logout on successful recovery");
    assert_eq!(
        tokens.get().await.as_deref(),
        Some("fresh-token"),
        "refreshed token becomes the stored credential"
    );
}

#[tokio::test]
async fn second_401_propagates_without_another_refresh() {
    let server = MockServer::start().await;

    // The endpoint rejects both the original and the retried request.
    Mock::given(method("GET"))
        .and(path("/api/v1/vendors"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let refresher = StaticRefresher::new("fresh-token");
    let (logout, _) = NotifyLogout::new();
    let client = client_with(
        &server,
        TokenStore::with_token("stale-token"),
        refresher.clone(),
        logout,
    );

    let response = client.get("/api/v1/vendors").await.expect("response returned");

    assert_eq!(response.status(), 401, "retried 401 propagates unchanged");
    assert_eq!(refresher.call_count(), 1, "no second refresh attempt");
}

#[tokio::test]
async fn refresh_failure_is_terminal_and_fires_logout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vendors"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = FailingRefresher::new();
    let (logout, notified) = NotifyLogout::new();
    let client = client_with(
        &server,
        TokenStore::with_token("stale-token"),
        refresher.clone(),
        logout.clone(),
    );

    let err = client.get("/api/v1/vendors").await.unwrap_err();
    assert!(matches!(err, ClientError::RefreshFailed(_)));
    assert_eq!(refresher.call_count(), 1);

    // Logout is fired without being awaited; give it a moment to land.
    tokio::time::timeout(Duration::from_secs(2), notified.notified())
        .await
        .expect("logout hook fires");
    assert_eq!(logout.call_count(), 1);
}

#[tokio::test]
async fn non_401_errors_propagate_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vendors"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = StaticRefresher::new("unused");
    let (logout, _) = NotifyLogout::new();
    let client = client_with(
        &server,
        TokenStore::with_token("token"),
        refresher.clone(),
        logout,
    );

    let response = client.get("/api/v1/vendors").await.expect("response returned");
    assert_eq!(response.status(), 503);
    assert_eq!(refresher.call_count(), 0, "only 401 triggers a refresh");
}

// ==================== HTTP Refresher ====================

#[tokio::test]
async fn auth_refresher_exchanges_and_rotates_refresh_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "refresh-0"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "access-1",
            "refresh_token": "refresh-1",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "access-2",
            "refresh_token": "refresh-2",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = AuthRefresher::new(
        format!("{}/api/auth/refresh", server.uri()),
        "refresh-0",
    )
    .expect("refresher builds");

    assert_eq!(refresher.refresh_token().await.expect("first"), "access-1");
    // Second refresh must present the rotated token.
    assert_eq!(refresher.refresh_token().await.expect("second"), "access-2");
}

#[tokio::test]
async fn auth_refresher_maps_rejection_to_refresh_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "message": "Authentication token has been revoked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = AuthRefresher::new(
        format!("{}/api/auth/refresh", server.uri()),
        "revoked-refresh",
    )
    .expect("refresher builds");

    let err = refresher.refresh_token().await.unwrap_err();
    assert!(matches!(err, ClientError::RefreshFailed(_)));
}

// ==================== End-to-End Recovery ====================

#[tokio::test]
async fn pipeline_recovers_end_to_end_with_http_refresher() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/purchase-orders"))
        .and(header("authorization", "Bearer expired-access"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/purchase-orders"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "live-refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "new-access",
            "refresh_token": "rotated-refresh",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let refresher = Arc::new(
        AuthRefresher::new(
            format!("{}/api/auth/refresh", server.uri()),
            "live-refresh",
        )
        .expect("refresher builds"),
    );
    let (logout, _) = NotifyLogout::new();
    let tokens = TokenStore::with_token("expired-access");
    let client = ApiClient::with_token_store(server.uri(), tokens.clone(), refresher, logout)
        .expect("client builds");

    let response = client
        .get("/api/v1/purchase-orders")
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    assert_eq!(tokens.get().await.as_deref(), Some("new-access"));
}
