//! Error types for the serp-digest pipeline.
//!
//! All errors use stable string messages suitable for display to callers
//! and programmatic handling. Secondary page-fetch failures never appear
//! here: they are absorbed inside summarization and collapse to an empty
//! summary instead.

/// Errors that can occur while acquiring and enriching search results.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request was rejected before any I/O (empty query, bad limit).
    #[error("invalid request: {0}")]
    Validation(String),

    /// The search engine served a challenge page instead of results.
    /// Terminal for the request; diagnostic artifacts were captured.
    #[error("blocked by search engine: {0}")]
    Blocked(String),

    /// The results page failed to load or settle within its timeout.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The headless browser could not be launched or driven.
    #[error("browser error: {0}")]
    Browser(String),

    /// Failed to parse markup with a CSS selector.
    #[error("parse error: {0}")]
    Parse(String),

    /// The record store rejected a read or write.
    #[error("store error: {0}")]
    Store(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// True when the engine actively refused the request, as opposed to a
    /// generic failure. Callers use this to distinguish "blocked" in their
    /// error payloads.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

/// Convenience type alias for serp-digest results.
pub type Result<T> = std::result::Result<T, SearchError>;
