//! DuckDuckGo HTML endpoint. No key required.
//!
//! Endpoint: https://html.duckduckgo.com/html/

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::instrument;
use url::Url;

use super::{fragment_text, SearchError, SearchHit, SearchProvider};

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) FraudLens/0.1";

pub struct DuckDuckGoHtml {
    client: Client,
}

impl DuckDuckGoHtml {
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoHtml {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let resp = self.client
            .get(DDG_HTML_URL)
            .query(&[("q", query)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }
        let page = resp.text().await?;
        parse_results(&page, limit)
    }

    fn name(&self) -> &str { "duckduckgo" }
}

fn selector(css: &'static str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(e.to_string()))
}

/// Organic results from a results page, ads skipped.
pub(crate) fn parse_results(page: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(page);
    let result_sel = selector("div.result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut hits = Vec::new();
    for result in document.select(&result_sel) {
        if hits.len() == limit {
            break;
        }
        if result.value().classes().any(|c| c == "result--ad") {
            continue;
        }
        let Some(link) = result.select(&title_sel).next() else {
            continue;
        };
        let title = fragment_text(&link.inner_html());
        if title.is_empty() {
            continue;
        }
        let description = result
            .select(&snippet_sel)
            .next()
            .map(|s| fragment_text(&s.inner_html()))
            .unwrap_or_default();
        let url = link.value().attr("href").and_then(target_url);

        hits.push(SearchHit { title, description, url });
    }
    Ok(hits)
}

/// Result links go through a redirect (`//duckduckgo.com/l/?uddg=<target>`);
/// return the target when present, otherwise the link itself.
fn target_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;
    let target = parsed
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned());
    Some(target.unwrap_or(absolute))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
    <html><body>
      <div class="result results_links result--ad">
        <a class="result__a" href="https://ads.example/x">Sponsored broker</a>
        <a class="result__snippet">Trade now</a>
      </div>
      <div class="result results_links results_links_deep web-result">
        <h2 class="result__title">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.mfsa.mt%2Fcyber&amp;rut=abc">MFSA <b>Cybersecurity</b> Guidance</a>
        </h2>
        <a class="result__snippet" href="#">Licence holders must report <b>ICT</b> incidents.</a>
      </div>
      <div class="result results_links web-result">
        <a class="result__a" href="https://example.org/dora">DORA overview</a>
      </div>
      <div class="result results_links web-result">
        <a class="result__a" href="https://example.org/third">Third</a>
        <a class="result__snippet">Not reached</a>
      </div>
    </body></html>"##;

    #[test]
    fn test_parse_skips_ads_and_respects_limit() {
        let hits = parse_results(PAGE, 2).unwrap();
        assert_eq!(hits.len(), 2);

        assert_eq!(hits[0].title, "MFSA Cybersecurity Guidance");
        assert_eq!(hits[0].description, "Licence holders must report ICT incidents.");
        assert_eq!(hits[0].url.as_deref(), Some("https://www.mfsa.mt/cyber"));

        assert_eq!(hits[1].title, "DORA overview");
        assert_eq!(hits[1].description, "");
        assert_eq!(hits[1].url.as_deref(), Some("https://example.org/dora"));
    }

    #[test]
    fn test_page_without_results_is_empty() {
        let hits = parse_results("<html><body><div class=\"no-results\">No results.</div></body></html>", 2).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_target_url_passthrough_for_direct_links() {
        assert_eq!(target_url("https://a.example/p").as_deref(), Some("https://a.example/p"));
        assert_eq!(target_url("not a url"), None);
    }
}
