//! Test application setup utilities
//!
//! Builds an application instance against an in-memory SQLite database.
//! The full router is used, gatekeeper included, so every test request
//! passes host validation and tenant resolution exactly like production
//! traffic. External gateways point at wiremock servers where a test
//! needs them; the itinerary client ships with no API key by default and
//! therefore uses its deterministic fallback.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tower::{Layer, ServiceExt};

use aire_marketplace::middleware::auth::create_session_token;
use aire_marketplace::middleware::tenant_gatekeeper;
use aire_marketplace::services::{
    ActionThrottle, EmailService, GeminiGenerator, StripeGateway,
};
use aire_marketplace::{build_router, db, AppConfig, AppState};

/// Test application wrapper for integration testing
pub struct TestApp {
    pub router: axum::Router,
    pub state: AppState,
}

/// Default test configuration: base domain `aire.com`, platform root
/// `vercel.app`, in-memory database.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret-0123456789abcdef".to_string();
    config.tenancy.base_domain = "aire.com".to_string();
    config.tenancy.platform_roots = vec!["vercel.app".to_string()];
    config.tenancy.app_url = "https://aire.com".to_string();
    config.database.url = "sqlite::memory:".to_string();
    // A single connection keeps every query on the same in-memory database
    config.database.max_connections = 1;
    config.payments.webhook_secret = "whsec_test_secret".to_string();
    config
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = db::init_pool(&config.database)
            .await
            .expect("Failed to initialize test database");

        let itinerary = Arc::new(
            GeminiGenerator::new(config.itinerary.clone())
                .expect("Failed to build itinerary client"),
        );
        let payments = Arc::new(
            StripeGateway::new(config.payments.clone()).expect("Failed to build gateway client"),
        );
        let email = Arc::new(EmailService::new(None).expect("Failed to build email service"));
        let throttle = Arc::new(ActionThrottle::new(Duration::from_secs(60)));

        let state = AppState {
            config,
            db,
            itinerary,
            payments,
            email,
            throttle,
        };

        let router = build_router(state.clone());

        Self { router, state }
    }

    /// Mint a session token the way the external identity provider would.
    pub fn token_for(&self, user_id: &str) -> String {
        create_session_token(user_id, &self.state.config.auth.jwt_secret, 1)
            .expect("Failed to mint test token")
    }

    fn base_host(&self) -> String {
        self.state.config.tenancy.base_domain.clone()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        // Wrap the router the same way main does: the gatekeeper must run
        // before routing for its rewrite to select the tenant routes.
        let app = axum::middleware::from_fn_with_state(self.state.clone(), tenant_gatekeeper)
            .layer(self.router.clone());

        let response = app.oneshot(request).await.expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.get_with_host(path, &self.base_host()).await
    }

    pub async fn get_with_host(&self, path: &str, host: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::HOST, self.base_host())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json_with_host(
        &self,
        path: &str,
        host: &str,
        body: &serde_json::Value,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::HOST, host)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json_auth(
        &self,
        path: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::HOST, self.base_host())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty_auth(&self, path: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::HOST, self.base_host())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn put_json_auth(
        &self,
        path: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> TestResponse {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header(header::HOST, self.base_host())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .header(header::HOST, self.base_host())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Raw POST for webhook requests with explicit extra headers.
    pub async fn post_raw(
        &self,
        path: &str,
        extra_headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::HOST, self.base_host())
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in extra_headers {
            builder = builder.header(*name, value.as_str());
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

/// Captured response for assertions
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_ok(&self) {
        assert!(
            self.status.is_success(),
            "Expected success, got {}: {}",
            self.status,
            self.text()
        );
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected {}, got {}: {}",
            expected,
            self.status,
            self.text()
        );
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse response JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
