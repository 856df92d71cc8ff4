//! Flower Shop API Library
//!
//! Order management for a flower shop: HTTP handlers, the order store
//! abstraction with its SeaORM and in-memory implementations, and the
//! configuration, logging and persistence plumbing around them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod tracing;

use axum::{routing::get, Router};
use http::HeaderValue;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::repositories::{InMemoryOrderStore, OrderRepository, OrderStore};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, config: AppConfig) -> Self {
        Self { store, config }
    }

    /// Builds state backed by the store selected in `config.store_backend`.
    ///
    /// The database backend connects using the configured pool tuning and
    /// runs migrations first when `auto_migrate` is set.
    pub async fn from_config(config: AppConfig) -> Result<Self, ServiceError> {
        let store: Arc<dyn OrderStore> = if config.uses_in_memory_store() {
            ::tracing::info!("Using in-memory order store");
            Arc::new(InMemoryOrderStore::new())
        } else {
            let pool = db::establish_connection_from_app_config(&config).await?;
            if config.auto_migrate {
                db::run_migrations(&pool).await?;
            }
            Arc::new(OrderRepository::new(Arc::new(pool)))
        };

        Ok(Self::new(store, config))
    }
}

/// Order API routes, mounted under `/api/orders`
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/api/orders", handlers::orders::order_routes())
}

/// Build the CORS layer from configuration.
///
/// Explicit origins win; otherwise development (or an explicit override)
/// falls back to a permissive policy.
pub fn build_cors_layer(cfg: &AppConfig) -> Result<CorsLayer, ServiceError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(cfg.cors_allow_credentials))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        ::tracing::error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        Err(ServiceError::InternalError(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .to_string(),
        ))
    }
}

/// Assemble the full application router: order API, health probes, Swagger UI
/// in development, plus tracing, CORS and request id layers.
pub fn build_router(state: AppState) -> Result<Router, ServiceError> {
    let cors_layer = build_cors_layer(&state.config)?;
    let swagger_enabled = state.config.is_development();

    let mut app = Router::<AppState>::new()
        .route("/", get(|| async { "flowershop-api up" }))
        .nest("/health", handlers::health::health_routes())
        .merge(api_routes());

    if swagger_enabled {
        app = app.merge(openapi::swagger_ui());
    }

    Ok(app
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(cors_layer)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state))
}
