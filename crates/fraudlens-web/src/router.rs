//! Axum router: maps all URL paths to handlers.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use crate::handlers::{analyze, api, assistant, dashboard::dashboard, system};
use crate::state::SharedState;

/// Build and return the full Axum router.
pub fn build_router(state: SharedState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Pages
        .route("/",                  get(dashboard))
        .route("/analyze/email",     post(analyze::email))
        .route("/analyze/chat",      post(analyze::chat))
        .route("/analyze/document",  post(analyze::document))
        .route("/analyze/ai",        post(analyze::ai))
        .route("/assistant/toggle",  post(assistant::toggle))
        .route("/assistant/ask",     post(assistant::ask))
        .route("/assistant/clear",   post(assistant::clear))

        // API endpoints
        .route("/api/analyze/email",    post(api::analyze_email))
        .route("/api/analyze/chat",     post(api::analyze_chat))
        .route("/api/analyze/document", post(api::analyze_document))
        .route("/api/analyze/ai",       post(api::analyze_ai))
        .route("/api/assistant/ask",    post(api::ask))
        .route("/api/assistant/transcript", get(api::transcript).delete(api::clear_transcript))
        .route("/api/audit",            get(system::audit))
        .route("/healthz",              get(system::healthz))

        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
