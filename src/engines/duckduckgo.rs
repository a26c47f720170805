//! DuckDuckGo results scraper — simpler markup, rarely blocks.
//!
//! Alternate source targeting the HTML-only endpoint. Uses a single
//! extraction strategy and no block-detection step; exists for callers
//! that want a second engine, and is never chained automatically when
//! the primary fails.

use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::browser::BrowserSession;
use crate::config::SearchConfig;
use crate::engine::ResultScraper;
use crate::error::{Result, SearchError};
use crate::extract;
use crate::types::{Engine, RawResult};

/// How long the page gets to settle after the document parse before the
/// markup snapshot is taken.
const SETTLE_DELAY: Duration = Duration::from_millis(400);

/// Secondary scraper. No cookies, no countermeasures, no diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DuckDuckGoScraper;

impl ResultScraper for DuckDuckGoScraper {
    async fn scrape(
        &self,
        query: &str,
        limit: usize,
        config: &SearchConfig,
    ) -> Result<Vec<RawResult>> {
        tracing::trace!(query, limit, "DuckDuckGo scrape");

        let url = search_url(query)?;
        let session = BrowserSession::launch(config, false).await?;

        let nav_timeout = Duration::from_secs(config.navigation_timeout_seconds);
        if let Err(err) = session.navigate(&url, nav_timeout).await {
            session.close().await;
            return Err(err);
        }
        tokio::time::sleep(SETTLE_DELAY).await;

        let html = match session.html().await {
            Ok(html) => html,
            Err(err) => {
                session.close().await;
                return Err(err);
            }
        };
        session.close().await;

        let results = parse_results(&html, limit)?;
        tracing::debug!(count = results.len(), query, "extracted raw results");
        Ok(results)
    }

    fn engine(&self) -> Engine {
        Engine::DuckDuckGo
    }
}

/// Build the query URL for the HTML-only endpoint.
fn search_url(query: &str) -> Result<String> {
    let url = Url::parse_with_params("https://duckduckgo.com/html/", [("q", query)])
        .map_err(|e| SearchError::Navigation(format!("failed to build query URL: {e}")))?;
    Ok(url.into())
}

/// Single extraction strategy over `.result` containers.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn parse_results(html: &str, limit: usize) -> Result<Vec<RawResult>> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(".result")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("a.result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let any_link_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid link selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet, .result__excerpt")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();
    for element in document.select(&result_sel) {
        let (title, href) = match element.select(&title_sel).next() {
            Some(a) => (
                a.text().collect::<String>(),
                a.value().attr("href").unwrap_or_default(),
            ),
            None => match element.select(&any_link_sel).next() {
                Some(a) => (
                    a.text().collect::<String>(),
                    a.value().attr("href").unwrap_or_default(),
                ),
                None => continue,
            },
        };
        let url = match extract_url(href) {
            Some(u) => u,
            None => continue,
        };
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        results.push(RawResult {
            title,
            url,
            snippet,
        });
    }

    Ok(extract::normalise(results, limit))
}

/// Extract the actual URL from DuckDuckGo's redirect wrapper.
///
/// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
/// we parse out the `uddg` query parameter and URL-decode it.
fn extract_url(href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full_href).ok()?;
    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}
