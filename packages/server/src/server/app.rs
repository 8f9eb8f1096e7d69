//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, patch},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::kernel::{create_ai, InMemorySummaryCache, ServerDeps};
use crate::server::routes::{
    create_comment_handler, health_handler, list_comments, list_parcels, parcel_neighbors,
    summary_get_handler, summary_post_handler, vote_comment_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    pub generation_enabled: bool,
}

impl AppState {
    pub fn new(deps: ServerDeps, generation_enabled: bool) -> Self {
        Self {
            db_pool: deps.db_pool.clone(),
            deps: Arc::new(deps),
            generation_enabled,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}

/// Build the router around an already assembled state
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/parcels", get(list_parcels))
        .route("/parcels/:id/neighbors", get(parcel_neighbors))
        .route("/comments", get(list_comments).post(create_comment_handler))
        .route(
            "/comments/summary",
            get(summary_get_handler).post(summary_post_handler),
        )
        .route("/comments/:id/vote", patch(vote_comment_handler))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Build the Axum application router from configuration
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let ai = create_ai(config.anthropic_api_key.clone(), &config.summary.model);
    let summary_cache = Arc::new(InMemorySummaryCache::new());

    let deps = ServerDeps::new(pool, ai, summary_cache, config.summary.clone());
    let state = AppState::new(deps, config.anthropic_api_key.is_some());

    build_router(state, &config.allowed_origins)
}
