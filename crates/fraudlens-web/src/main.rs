//! FraudLens dashboard server.
//!
//! Run with: cargo run -p fraudlens-web
//! Requires FRAUDLENS_API_KEY (or API_KEY) in the environment or a .env file.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use fraudlens_analysis::enrich::{build_provider, EvidenceEnricher};
use fraudlens_analysis::FraudLens;
use fraudlens_common::AppConfig;
use fraudlens_llm::audit::{AuditLog, AuditedBackend};
use fraudlens_llm::backend::OpenAiCompatibleBackend;
use fraudlens_llm::{LlmBackend, RetryPolicy};
use fraudlens_web::state::{AppState, SharedState};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fraudlens=debug,info")),
        )
        .init();

    info!("Starting FraudLens...");

    let mut config = AppConfig::load().context("FraudLens configuration is invalid")?;
    let api_key = config.inference.api_key.take().context("no inference credential")?;

    let audit = Arc::new(AuditLog::new(config.web.audit_capacity));
    let client = OpenAiCompatibleBackend::new(
        config.inference.base_url.clone(),
        api_key,
        config.inference.timeout(),
    )?
    .with_defaults(config.inference.max_tokens, config.inference.temperature);
    let backend: Arc<dyn LlmBackend> = Arc::new(AuditedBackend::new(Arc::new(client), audit.clone()));

    let provider = build_provider(&config.search)?;
    info!(provider = provider.name(), "Evidence search provider ready");
    let enricher = EvidenceEnricher::new(provider, config.search.steering_suffix.clone());

    let retry = RetryPolicy {
        max_attempts: config.retry.max_attempts,
        delay: Duration::from_millis(config.retry.delay_ms),
        fallback: config.retry.fallback.clone(),
    };
    let lens = FraudLens::new(backend, enricher, config.models.clone())
        .with_retry(retry)
        .with_num_results(config.search.num_results);

    let state: SharedState = Arc::new(AppState::new(lens, audit, &config.web)?);

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.sessions.purge_idle().await;
        }
    });

    let router = fraudlens_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.web.bind)
        .await
        .with_context(|| format!("could not bind {}", config.web.bind))?;
    info!(
        base_url = %config.inference.base_url,
        text_model = %config.models.text,
        vision_model = %config.models.vision,
        "FraudLens listening on http://{}",
        config.web.bind
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("FraudLens stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
