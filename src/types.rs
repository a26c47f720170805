//! Core types for raw results, enriched results, and persisted records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single result as found on the results page, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    /// The title of the result.
    pub title: String,
    /// The URL of the result.
    pub url: String,
    /// A text snippet from the results page; may be empty.
    pub snippet: String,
}

/// A raw result enriched with its rank and a short extractive summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedResult {
    /// 1-based rank, reflecting extraction order.
    pub position: usize,
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Short extractive summary derived from the snippet or a page fetch.
    pub summary: String,
    /// Coarse result classification tag.
    #[serde(rename = "type")]
    pub result_type: String,
}

/// One completed pipeline run for a query.
///
/// Records are insert-only: a run always creates a fresh record and older
/// records for the same query are left to expire, so recency is decided by
/// `created_at` at lookup time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: Uuid,
    pub query: String,
    /// Ordered enriched results; positions are 1-based and contiguous.
    pub results: Vec<EnrichedResult>,
    /// Synopsis aggregated from the top results' summaries.
    pub aggregate_summary: String,
    pub created_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Build a fresh record stamped with a new id and the current time.
    pub fn new(
        query: impl Into<String>,
        results: Vec<EnrichedResult>,
        aggregate_summary: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            results,
            aggregate_summary,
            created_at: Utc::now(),
        }
    }
}

/// The outcome of a submitted search: the record plus whether it came
/// from the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub cached: bool,
    pub record: SearchRecord,
}

/// The search engines this crate can scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    /// Google — primary engine; best results but aggressive bot detection.
    Google,
    /// DuckDuckGo — secondary engine; simpler markup, rarely blocks.
    DuckDuckGo,
}

impl Engine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
