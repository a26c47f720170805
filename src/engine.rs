//! Trait definition for pluggable result scrapers.
//!
//! Each engine (Google, DuckDuckGo) implements [`ResultScraper`] to provide
//! a uniform interface for driving a browser session and extracting raw
//! results from the rendered page.

use crate::config::SearchConfig;
use crate::error::Result;
use crate::types::{Engine, RawResult};

/// A pluggable result scraper.
///
/// Implementors drive one isolated browser session end-to-end: launch,
/// navigate to the engine's query URL, extract, clean up. Each engine
/// handles its own:
///
/// - Query URL construction with encoding
/// - Browser identity and anti-detection countermeasures
/// - Extraction from the rendered markup
/// - Block detection, where the engine employs it
///
/// All implementations must be `Send + Sync` so a pipeline can be shared
/// across concurrent requests.
pub trait ResultScraper: Send + Sync {
    /// Scrape up to `limit` results for `query`, in page order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Blocked`] when the engine serves a
    /// challenge page, [`crate::SearchError::Navigation`] when the page
    /// fails to load or settle, or [`crate::SearchError::Browser`] when
    /// the session itself cannot be driven. An empty page is not an
    /// error: it yields an empty list.
    fn scrape(
        &self,
        query: &str,
        limit: usize,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<RawResult>>> + Send;

    /// Returns which [`Engine`] this implementation scrapes.
    fn engine(&self) -> Engine;
}
