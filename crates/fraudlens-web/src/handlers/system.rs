//! Liveness and the inference audit trail.

use axum::{
    extract::{Query, State},
    response::Json,
};
use fraudlens_llm::audit::LlmAuditEntry;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::SharedState;

pub async fn healthz(State(state): State<SharedState>) -> Json<Value> {
    let models = state.lens.models();
    let sessions = state.sessions.len().await;
    Json(json!({
        "status": "ok",
        "text_model": models.text,
        "vision_model": models.vision,
        "sessions": sessions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize { 50 }

/// Most recent inference calls, newest first.
pub async fn audit(
    State(state): State<SharedState>,
    Query(query): Query<AuditQuery>,
) -> Json<Vec<LlmAuditEntry>> {
    Json(state.audit.recent(query.limit))
}
