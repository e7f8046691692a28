//! Evidence enricher: web-search snippets for the compliance assistant.
//!
//! Providers:
//!   DuckDuckGoHtml: keyless HTML results page, parsed with `scraper`
//!   BraveSearch:    Brave Web Search JSON API (needs BRAVE_API_KEY)
//!
//! `EvidenceEnricher::gather` keeps the cause of an empty or failed search;
//! `fetch_context` flattens it to the prompt text and never fails.

mod brave;
mod duckduckgo;

pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoHtml;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fraudlens_common::config::{SearchConfig, SearchProviderKind};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Context text when the search succeeded but found nothing.
pub const NO_DATA: &str = "No direct regulatory data found.";
/// Context text when the search itself failed.
pub const UNAVAILABLE: &str = "Regulatory search unavailable at the moment.";

pub const DEFAULT_NUM_RESULTS: usize = 2;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Search provider returned HTTP {0}")]
    Status(u16),
    #[error("Could not parse search results: {0}")]
    Parse(String),
    #[error("Search provider misconfigured: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
}

impl SearchHit {
    /// `Source: {title}\nContent: {description}`
    pub fn to_snippet(&self) -> String {
        format!("Source: {}\nContent: {}", self.title, self.description)
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `limit` hits, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;

    fn name(&self) -> &str;
}

#[derive(Debug)]
pub enum Evidence {
    Found(Vec<SearchHit>),
    Empty,
    Unavailable(SearchError),
}

impl Evidence {
    /// Text block handed to the model as regulatory context.
    pub fn context_text(&self) -> String {
        match self {
            Evidence::Found(hits) => hits
                .iter()
                .map(SearchHit::to_snippet)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Evidence::Empty => NO_DATA.to_string(),
            Evidence::Unavailable(_) => UNAVAILABLE.to_string(),
        }
    }

    pub fn hits(&self) -> &[SearchHit] {
        match self {
            Evidence::Found(hits) => hits,
            _ => &[],
        }
    }
}

pub struct EvidenceEnricher {
    provider: Arc<dyn SearchProvider>,
    steering_suffix: String,
}

impl EvidenceEnricher {
    pub fn new(provider: Arc<dyn SearchProvider>, steering_suffix: impl Into<String>) -> Self {
        Self { provider, steering_suffix: steering_suffix.into() }
    }

    /// The query as sent to the provider, biased toward the compliance domain.
    pub fn steered_query(&self, query: &str) -> String {
        let suffix = self.steering_suffix.trim();
        if suffix.is_empty() {
            query.to_string()
        } else {
            format!("{query} {suffix}")
        }
    }

    pub async fn gather(&self, query: &str, num_results: usize) -> Evidence {
        let steered = self.steered_query(query);
        match self.provider.search(&steered, num_results).await {
            Ok(mut hits) => {
                hits.truncate(num_results);
                debug!(provider = self.provider.name(), hits = hits.len(), "Evidence search finished");
                if hits.is_empty() {
                    Evidence::Empty
                } else {
                    Evidence::Found(hits)
                }
            }
            Err(e) => {
                warn!(provider = self.provider.name(), "Evidence search failed: {e}");
                Evidence::Unavailable(e)
            }
        }
    }

    pub async fn fetch_context(&self, query: &str, num_results: usize) -> String {
        self.gather(query, num_results).await.context_text()
    }
}

/// Build the provider selected in config.
pub fn build_provider(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>, SearchError> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));
    match config.provider {
        SearchProviderKind::DuckDuckGo => Ok(Arc::new(DuckDuckGoHtml::new(timeout)?)),
        SearchProviderKind::Brave => {
            let key = config
                .brave_api_key
                .as_ref()
                .ok_or_else(|| SearchError::Config("BRAVE_API_KEY is not set".into()))?;
            Ok(Arc::new(BraveSearch::new(key.expose_secret(), timeout)?))
        }
    }
}

/// Plain text of an HTML fragment, whitespace collapsed.
pub(crate) fn fragment_text(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
