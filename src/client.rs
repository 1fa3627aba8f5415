//! Authenticated HTTP client pipeline.
//!
//! Every outbound request carries the currently stored bearer token, and a
//! single 401 per call is recovered transparently: the injected refresher is
//! asked for a new token, the token store is updated, and the original
//! request is re-issued exactly once. A failed refresh is terminal for the
//! request chain and fires the injected logout hook without awaiting it.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Client pipeline errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

/// Shared access-token cell. Reads and writes are last-write-wins; the store
/// is handed around explicitly instead of living in process-global state.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.inner.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

/// Injected operation that obtains a fresh access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh_token(&self) -> Result<String, ClientError>;
}

/// Injected operation invoked when a refresh fails. Fired without being
/// awaited; it must not matter for request correctness.
#[async_trait]
pub trait LogoutHook: Send + Sync {
    async fn logout(&self);
}

/// HTTP client that drives the authenticated request pipeline.
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenStore,
    refresher: Arc<dyn TokenRefresher>,
    logout: Arc<dyn LogoutHook>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        refresher: Arc<dyn TokenRefresher>,
        logout: Arc<dyn LogoutHook>,
    ) -> Result<Self, ClientError> {
        Self::with_token_store(base_url, TokenStore::new(), refresher, logout)
    }

    pub fn with_token_store(
        base_url: impl Into<String>,
        tokens: TokenStore,
        refresher: Arc<dyn TokenRefresher>,
        logout: Arc<dyn LogoutHook>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            refresher,
            logout,
        })
    }

    /// Handle to the token store this client reads and updates.
    pub fn token_store(&self) -> TokenStore {
        self.tokens.clone()
    }

    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        self.dispatch(Method::GET, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, ClientError> {
        self.dispatch(Method::DELETE, path, None).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, ClientError> {
        self.dispatch(Method::POST, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, ClientError> {
        self.dispatch(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await
    }

    /// Sends a request, recovering from a single 401 by refreshing the token
    /// and re-issuing the original request once. Non-401 responses propagate
    /// unchanged, whatever their status.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, ClientError> {
        let response = self.issue(&method, path, body.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // One recovery attempt per request chain.
        debug!("Received 401 for {} {}, refreshing token", method, path);
        match self.refresher.refresh_token().await {
            Ok(token) => {
                self.tokens.set(token).await;
                self.issue(&method, path, body.as_ref()).await
            }
            Err(err) => {
                warn!("Token refresh failed, logging out: {}", err);
                let hook = self.logout.clone();
                tokio::spawn(async move { hook.logout().await });
                Err(err)
            }
        }
    }

    async fn issue(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        if let Some(token) = self.tokens.get().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

/// `TokenRefresher` that exchanges a refresh token at the auth refresh
/// endpoint, rotating its stored refresh token on every success.
pub struct AuthRefresher {
    http: Client,
    refresh_url: String,
    refresh_token: RwLock<String>,
}

impl AuthRefresher {
    pub fn new(
        refresh_url: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            refresh_url: refresh_url.into(),
            refresh_token: RwLock::new(refresh_token.into()),
        })
    }
}

#[async_trait]
impl TokenRefresher for AuthRefresher {
    async fn refresh_token(&self) -> Result<String, ClientError> {
        let current = self.refresh_token.read().await.clone();

        let response = self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh_token": current }))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ClientError::RefreshFailed(format!(
                "refresh endpoint returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::RefreshFailed("response missing token".to_string()))?
            .to_string();

        // The server rotates refresh tokens; keep the replacement.
        if let Some(rotated) = body.get("refresh_token").and_then(Value::as_str) {
            *self.refresh_token.write().await = rotated.to_string();
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_store_is_last_write_wins() {
        let store = TokenStore::new();
        assert_eq!(store.get().await, None);

        store.set("first").await;
        store.set("second").await;
        assert_eq!(store.get().await.as_deref(), Some("second"));

        store.clear().await;
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn token_store_clones_share_state() {
        let store = TokenStore::with_token("shared");
        let other = store.clone();

        other.set("replaced").await;
        assert_eq!(store.get().await.as_deref(), Some("replaced"));
    }
}
