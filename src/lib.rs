//! tinylink: a short-link registry with click counting.
//!
//! The core is [`directory::LinkDirectory`] (create / list / inspect / delete)
//! and [`resolver::RedirectResolver`] (code to redirect target), both composed
//! over a [`registry::LinkRegistry`] backend. [`router`] wires them into the
//! HTTP surface.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub mod codegen;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod resolver;

use directory::LinkDirectory;
use registry::LinkRegistry;
use resolver::RedirectResolver;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: config::AppConfig,
    pub directory: LinkDirectory,
    pub resolver: RedirectResolver,
}

impl AppState {
    pub fn new(config: config::AppConfig, registry: Arc<dyn LinkRegistry>) -> Self {
        Self {
            config,
            directory: LinkDirectory::new(registry.clone()),
            resolver: RedirectResolver::new(registry),
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/links",
            post(handlers::api::create_link).get(handlers::api::list_links),
        )
        .route(
            "/links/:code",
            get(handlers::api::get_link).delete(handlers::api::delete_link),
        );

    Router::new()
        .route("/", get(handlers::dashboard::dashboard))
        .route("/links", post(handlers::dashboard::create_link))
        .route("/links/:code/delete", post(handlers::dashboard::delete_link))
        .route("/code/:code", get(handlers::dashboard::stats))
        .nest("/api", api_router)
        // Short-link redirect. No single-segment static route above is a
        // valid 6-8 char code, so every registered code reaches this handler.
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
}
