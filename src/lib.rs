//! # serp-digest
//!
//! Browser-driven web search enrichment: answer a free-text query with a
//! ranked list of search-engine results, each carrying a short extractive
//! summary, plus an aggregate synopsis — cached for a bounded window.
//!
//! ## Design
//!
//! - Scrapes the results page with a headless Chromium session: pinned
//!   desktop identity, anti-detection countermeasures, persisted cookies
//! - Extraction is a fallback chain of CSS-selector strategies, so markup
//!   drift degrades gracefully instead of breaking extraction outright
//! - Summaries are extractive: first sentence of the snippet or of a
//!   paragraph fetched from the result page — no language model
//! - Records are insert-only with store-enforced TTL expiry; lookups pick
//!   the newest non-expired record for a query
//! - One isolated browser session per request; no pooling, no automatic
//!   retries anywhere
//!
//! ## Security
//!
//! - No API keys or secrets to manage
//! - No network listeners — this is a library, not a server
//! - Search queries are logged only at trace level
//! - Diagnostic artifacts are write-only and never read back
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> serp_digest::Result<()> {
//! let config = serp_digest::SearchConfig::default();
//! let pipeline = serp_digest::SearchPipeline::with_defaults(config)?;
//!
//! let outcome = pipeline.submit("rust programming", None, false).await?;
//! println!(
//!     "cached: {}, results: {}, synopsis: {}",
//!     outcome.cached,
//!     outcome.record.results.len(),
//!     outcome.record.aggregate_summary
//! );
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod http;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod summarize;
pub mod types;

mod browser;
mod extract;

pub use cache::SearchCache;
pub use config::{SearchConfig, MAX_RESULTS};
pub use diagnostics::{DiagnosticsSink, FsDiagnostics, NoopDiagnostics};
pub use engine::ResultScraper;
pub use engines::{DuckDuckGoScraper, GoogleScraper};
pub use error::{Result, SearchError};
pub use fetch::PageSummaryFetcher;
pub use orchestrator::SearchPipeline;
pub use session::{CookieRecord, FileSessionStore, SessionStore};
pub use store::{MemoryStore, RecordStore};
pub use summarize::Summarizer;
pub use types::{Engine, EnrichedResult, RawResult, SearchOutcome, SearchRecord};
