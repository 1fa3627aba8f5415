#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    middleware,
    response::Response,
    Router,
};
use procure_api::{
    auth::{AuthConfig, AuthService, CredentialStore},
    config::AppConfig,
    db,
    handlers::AppServices,
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database, mirroring the router layering used by the binary.
pub struct TestApp {
    router: Router,
    pub auth_service: Arc<AuthService>,
    admin_token: String,
    user_token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // A single pooled connection keeps every query on the same in-memory
        // database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);

        let credentials =
            Arc::new(CredentialStore::seeded().expect("failed to seed credential store"));
        let auth_cfg = AuthConfig::from_app_config(&cfg);
        let auth_service = Arc::new(AuthService::new(auth_cfg, credentials));

        let services = AppServices::new(db_arc.clone());

        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            services,
        };

        let admin_token = auth_service
            .login("admin1", "adminpass")
            .await
            .expect("admin seed login")
            .token;
        let user_token = auth_service
            .login("buyer1", "buyerpass")
            .await
            .expect("user seed login")
            .token;

        let auth_service_for_layer = auth_service.clone();
        let router = Router::new()
            .nest("/api/v1", procure_api::api_v1_routes())
            .nest(
                "/api/auth",
                procure_api::auth::auth_routes().with_state(auth_service.clone()),
            )
            .layer(middleware::from_fn_with_state(
                auth_service_for_layer,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .with_state(state);

        Self {
            router,
            auth_service,
            admin_token,
            user_token,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn user_token(&self) -> &str {
        &self.user_token
    }

    /// Issue a request against the in-process router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(value) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("request builds");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds")
    }

    /// Issue a request carrying the admin bearer token.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        let token = self.admin_token.clone();
        self.request(method, uri, body, Some(&token)).await
    }
}

/// Decode a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
