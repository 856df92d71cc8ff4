use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use flowershop_api::{
    config::AppConfig,
    db,
    repositories::{OrderRepository, OrderStore},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up the application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    #[allow(dead_code)]
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::for_database("sqlite::memory:");
        // Each pooled connection would otherwise see its own empty in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let store: Arc<dyn OrderStore> = Arc::new(OrderRepository::new(Arc::new(pool)));
        let state = AppState::new(store, cfg);
        let router = flowershop_api::build_router(state.clone()).expect("router builds");

        Self { router, state }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Create an order over HTTP and return its JSON representation.
    #[allow(dead_code)]
    pub async fn create_order(&self, payload: Value) -> Value {
        let response = self.request(Method::POST, "/api/orders", Some(payload)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        read_json(response).await
    }
}

/// Read and parse a JSON response body.
#[allow(dead_code)]
pub async fn read_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&read_bytes(response).await).expect("parse response body")
}

/// Read a response body as raw bytes.
#[allow(dead_code)]
pub async fn read_bytes(response: axum::response::Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}
