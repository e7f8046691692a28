//! Shared application state for the web server.

use std::sync::Arc;

use fraudlens_analysis::FraudLens;
use fraudlens_common::config::WebConfig;
use fraudlens_llm::audit::AuditLog;
use minijinja::Environment;

use crate::session::SessionStore;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub lens: FraudLens,
    pub sessions: SessionStore,
    /// Fed by the `AuditedBackend` the lens calls through.
    pub audit: Arc<AuditLog>,
    pub templates: Environment<'static>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(lens: FraudLens, audit: Arc<AuditLog>, web: &WebConfig) -> Result<Self, minijinja::Error> {
        Ok(Self {
            lens,
            sessions: SessionStore::new(web.session_idle()),
            audit,
            templates: templates()?,
            max_upload_bytes: web.max_upload_bytes,
        })
    }
}

pub type SharedState = Arc<AppState>;

/// Templates are compiled into the binary. `.html` names get HTML auto-escaping.
fn templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("dashboard.html", include_str!("../templates/dashboard.html"))?;
    Ok(env)
}
