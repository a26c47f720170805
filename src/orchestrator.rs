//! Core pipeline: cache lookup, scrape, summarise, aggregate, persist.
//!
//! # Request flow
//!
//! 1. Validate: non-empty query, limit clamped into range — before any I/O
//! 2. Cache lookup (skipped on `force_refresh`); a hit short-circuits
//! 3. On a miss, scrape raw results from the engine
//! 4. Summarise every raw result concurrently (fan-out/fan-in)
//! 5. Aggregate the top summaries into one synopsis
//! 6. Persist a fresh record, then return it
//!
//! A blocked or failed navigation fails the whole request and writes
//! nothing. An empty scrape is not an error: the empty record is persisted
//! anyway, deliberately caching the negative outcome for the TTL window so
//! an actively blocked query is not re-scraped on every request.
//!
//! Concurrent submits for the same query are not coalesced: each runs the
//! pipeline and inserts its own record, and lookups resolve recency by
//! creation time.

use std::sync::Arc;

use crate::cache::SearchCache;
use crate::config::SearchConfig;
use crate::diagnostics::FsDiagnostics;
use crate::engine::ResultScraper;
use crate::engines::GoogleScraper;
use crate::error::{Result, SearchError};
use crate::fetch::PageSummaryFetcher;
use crate::session::FileSessionStore;
use crate::store::MemoryStore;
use crate::summarize::Summarizer;
use crate::types::SearchOutcome;

/// How many leading summaries feed the aggregate synopsis.
const TOP_SUMMARY_COUNT: usize = 3;

/// Composes cache, scraper, and summariser into one logical operation.
pub struct SearchPipeline<S: ResultScraper> {
    scraper: S,
    cache: SearchCache,
    summarizer: Summarizer,
    config: SearchConfig,
}

impl<S: ResultScraper> std::fmt::Debug for SearchPipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SearchPipeline<GoogleScraper> {
    /// Build a pipeline with the default wiring: the Google scraper with a
    /// file-backed session store and filesystem diagnostics, an in-memory
    /// TTL record store, and the summary fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn with_defaults(config: SearchConfig) -> Result<Self> {
        let scraper = GoogleScraper::new(
            Arc::new(FileSessionStore::new(config.cookie_path.clone())),
            Arc::new(FsDiagnostics::new(config.artifacts_dir.clone())),
        );
        let cache = SearchCache::new(Arc::new(MemoryStore::new(config.cache_ttl_seconds)));
        let summarizer = Summarizer::new(PageSummaryFetcher::new(&config)?);
        Self::new(scraper, cache, summarizer, config)
    }
}

impl<S: ResultScraper> SearchPipeline<S> {
    /// Build a pipeline from explicit components, validating the config.
    pub fn new(
        scraper: S,
        cache: SearchCache,
        summarizer: Summarizer,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scraper,
            cache,
            summarizer,
            config,
        })
    }

    /// Answer a query: from the cache when a fresh record exists, otherwise
    /// by running the full scrape-and-enrich pipeline.
    ///
    /// `limit` of `None` or `Some(0)` falls back to the configured default;
    /// anything larger than the hard cap is clamped down to it.
    /// `force_refresh` bypasses the cache lookup but still persists the
    /// fresh record on completion.
    ///
    /// # Errors
    ///
    /// [`SearchError::Validation`] for an empty query (before any I/O);
    /// [`SearchError::Blocked`], [`SearchError::Navigation`], or
    /// [`SearchError::Browser`] when the scrape fails — in which case no
    /// record is written and nothing partial is returned.
    pub async fn submit(
        &self,
        query: &str,
        limit: Option<usize>,
        force_refresh: bool,
    ) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::Validation("query must not be empty".into()));
        }
        let limit = self.config.clamp_limit(limit);

        if !force_refresh {
            if let Some(record) = self.cache.lookup(query).await? {
                return Ok(SearchOutcome {
                    cached: true,
                    record,
                });
            }
        }

        tracing::debug!(query, limit, engine = %self.scraper.engine(), "scraping");
        let raw = self.scraper.scrape(query, limit, &self.config).await?;

        tracing::debug!(count = raw.len(), "summarising results");
        let enriched = self.summarizer.enrich(raw).await;

        let top = enriched
            .iter()
            .take(TOP_SUMMARY_COUNT)
            .map(|r| r.summary.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let aggregate_summary = Summarizer::aggregate(&top);

        let record = self.cache.write(query, enriched, aggregate_summary).await?;
        Ok(SearchOutcome {
            cached: false,
            record,
        })
    }
}
