//! Brave Web Search API client.
//!
//! Endpoint: https://api.search.brave.com/res/v1/web/search

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::{fragment_text, SearchError, SearchHit, SearchProvider};

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
/// The API rejects larger page sizes.
const MAX_COUNT: usize = 20;

pub struct BraveSearch {
    client: Client,
    api_key: SecretString,
}

impl BraveSearch {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key: SecretString::from(api_key) })
    }
}

#[async_trait]
impl SearchProvider for BraveSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let count = limit.clamp(1, MAX_COUNT).to_string();
        let resp = self.client
            .get(BRAVE_SEARCH_URL)
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", self.api_key.expose_secret())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }
        let json = resp.json::<serde_json::Value>().await?;
        let hits = parse_results(&json, limit);
        debug!(count = hits.len(), "Brave search returned results");
        Ok(hits)
    }

    fn name(&self) -> &str { "brave" }
}

pub(crate) fn parse_results(json: &serde_json::Value, limit: usize) -> Vec<SearchHit> {
    json["web"]["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| {
                    let title = fragment_text(r["title"].as_str()?);
                    Some(SearchHit {
                        title,
                        description: fragment_text(r["description"].as_str().unwrap_or("")),
                        url: r["url"].as_str().map(String::from),
                    })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_brave_results() {
        let json = json!({
            "web": { "results": [
                {"title": "MFSA Rulebook", "description": "Chapter 3 <strong>cyber</strong> rules", "url": "https://mfsa.mt/r"},
                {"description": "untitled entries are dropped"},
                {"title": "ESMA", "url": "https://esma.europa.eu"},
                {"title": "beyond limit"}
            ]}
        });
        let hits = parse_results(&json, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "MFSA Rulebook");
        assert_eq!(hits[0].description, "Chapter 3 cyber rules");
        assert_eq!(hits[1].title, "ESMA");
        assert_eq!(hits[1].description, "");
    }

    #[test]
    fn test_missing_web_section_is_empty() {
        assert!(parse_results(&json!({"type": "search"}), 2).is_empty());
    }
}
