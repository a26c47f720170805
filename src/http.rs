//! Shared HTTP client with User-Agent rotation for secondary page fetches.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers,
//! cookie support, and rotating User-Agent strings. Used only for the
//! summary fetches; the results page itself goes through the browser.

use crate::config::SearchConfig;
use crate::error::SearchError;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for fetching arbitrary result pages.
///
/// The client has:
/// - Timeout from `config.fetch_timeout_seconds`
/// - Random User-Agent from the rotation list (or custom if configured)
/// - Cookie store enabled, limited redirects
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.fetch_timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}
