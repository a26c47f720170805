//! Pipeline configuration with sensible defaults.
//!
//! [`SearchConfig`] controls result limits, the cache TTL, per-step
//! timeouts, and the browser identity used for scraping. There is no
//! overall request deadline: boundedness comes from the per-step timeouts
//! alone.

use std::path::PathBuf;

use crate::error::SearchError;

/// Hard cap on results per request, regardless of what the caller asks for.
pub const MAX_RESULTS: usize = 15;

/// Configuration for the search pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Result count used when the caller passes no limit (or zero).
    pub default_limit: usize,
    /// How long a persisted record satisfies cache lookups, in seconds.
    /// Enforced by the record store itself, not recomputed at lookup.
    pub cache_ttl_seconds: u64,
    /// Time allowed for loading the results page, covering navigation and
    /// the initial document parse.
    pub navigation_timeout_seconds: u64,
    /// Bounded wait for the results container to appear after navigation.
    /// A missed wait is non-fatal; extraction proceeds regardless.
    pub selector_wait_ms: u64,
    /// Per-request timeout for secondary result-page fetches.
    pub fetch_timeout_seconds: u64,
    /// Fixed browser viewport `(width, height)`.
    pub viewport: (u32, u32),
    /// Browser locale, also sent as the Accept-Language base.
    pub locale: String,
    /// Timezone pinned on the browser session to reduce fingerprint variance.
    pub timezone: String,
    /// Where the cookie document is persisted between sessions.
    pub cookie_path: PathBuf,
    /// Where block/no-result diagnostic artifacts are written.
    pub artifacts_dir: PathBuf,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 8,
            cache_ttl_seconds: 6 * 60 * 60,
            navigation_timeout_seconds: 30,
            selector_wait_ms: 7_000,
            fetch_timeout_seconds: 8,
            viewport: (1366, 768),
            locale: "en-US".into(),
            timezone: "Asia/Kolkata".into(),
            cookie_path: PathBuf::from("tmp/cookies.json"),
            artifacts_dir: PathBuf::from("tmp/artifacts"),
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `default_limit` must be within `1..=MAX_RESULTS`
    /// - `cache_ttl_seconds` must be greater than 0
    /// - `navigation_timeout_seconds` must be greater than 0
    /// - `fetch_timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.default_limit == 0 || self.default_limit > MAX_RESULTS {
            return Err(SearchError::Config(format!(
                "default_limit must be within 1..={MAX_RESULTS}"
            )));
        }
        if self.cache_ttl_seconds == 0 {
            return Err(SearchError::Config(
                "cache_ttl_seconds must be greater than 0".into(),
            ));
        }
        if self.navigation_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "navigation_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.fetch_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the effective result limit for a request.
    ///
    /// A missing or zero limit falls back to `default_limit`; anything else
    /// is clamped into `1..=MAX_RESULTS`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            None | Some(0) => self.default_limit,
            Some(n) => n.clamp(1, MAX_RESULTS),
        }
    }
}
