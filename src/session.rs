//! Browser cookie persistence across scrape runs.
//!
//! Each scrape saves its session cookies after the attempt, success or
//! failure, so later runs inherit consent/session state and see fewer
//! challenge pages. The backing is swappable behind [`SessionStore`]; the
//! default is a single JSON document on disk, overwritten wholesale each
//! session (last writer wins, no merge).

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One persisted cookie. Carries only the fields needed to re-inject the
/// cookie into a fresh session; no application-level schema beyond that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Expiry as seconds since the UNIX epoch; `-1` for session cookies.
    #[serde(default)]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

/// Durable storage for a browser session's cookies.
///
/// Both operations are non-fatal by contract: a missing or corrupt store
/// yields an empty cookie set, and a failed save is logged and dropped.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the previously persisted cookie set, or empty if none.
    async fn load(&self) -> Vec<CookieRecord>;

    /// Persist the given cookie set, replacing whatever was stored before.
    async fn save(&self, cookies: &[CookieRecord]);
}

/// [`SessionStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Vec<CookieRecord> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::trace!(path = %self.path.display(), error = %e, "no persisted session");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<CookieRecord>>(&raw) {
            Ok(cookies) => {
                tracing::debug!(count = cookies.len(), "loaded persisted cookies");
                cookies
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to parse cookie document");
                Vec::new()
            }
        }
    }

    async fn save(&self, cookies: &[CookieRecord]) {
        let json = match serde_json::to_string_pretty(cookies) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialise cookies");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(path = %parent.display(), error = %e, "failed to create cookie directory");
                return;
            }
        }
        match tokio::fs::write(&self.path, json).await {
            Ok(()) => tracing::debug!(count = cookies.len(), "saved session cookies"),
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to save cookies"),
        }
    }
}
