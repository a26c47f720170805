//! Fire-and-forget diagnostic artifacts for blocked or empty scrapes.
//!
//! When the engine serves a challenge page, or extraction comes back empty,
//! the scraper captures a full-page screenshot plus the raw markup for
//! offline inspection. Artifacts are write-only: nothing in the pipeline
//! ever reads them back, and a failed write never fails the request.

use std::path::PathBuf;

use async_trait::async_trait;

/// Side-channel sink for scrape diagnostics.
#[async_trait]
pub trait DiagnosticsSink: Send + Sync {
    /// Record one capture. `screenshot` is PNG bytes when available;
    /// `markup` is the page HTML at capture time.
    async fn write(&self, prefix: &str, screenshot: Option<&[u8]>, markup: &str);
}

/// Writes timestamped `{prefix}-{millis}.png` / `.html` pairs under a
/// directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct FsDiagnostics {
    dir: PathBuf,
}

impl FsDiagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DiagnosticsSink for FsDiagnostics {
    async fn write(&self, prefix: &str, screenshot: Option<&[u8]>, markup: &str) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to create artifacts directory");
            return;
        }
        let millis = chrono::Utc::now().timestamp_millis();

        if let Some(png) = screenshot {
            let png_path = self.dir.join(format!("{prefix}-{millis}.png"));
            match tokio::fs::write(&png_path, png).await {
                Ok(()) => tracing::debug!(path = %png_path.display(), "saved screenshot artifact"),
                Err(e) => tracing::warn!(path = %png_path.display(), error = %e, "failed to save screenshot"),
            }
        }

        let html_path = self.dir.join(format!("{prefix}-{millis}.html"));
        match tokio::fs::write(&html_path, markup).await {
            Ok(()) => tracing::debug!(path = %html_path.display(), "saved markup artifact"),
            Err(e) => tracing::warn!(path = %html_path.display(), error = %e, "failed to save markup"),
        }
    }
}

/// Discards every capture. Used in tests and by callers that do not want
/// artifacts on disk.
#[derive(Debug, Clone, Default)]
pub struct NoopDiagnostics;

#[async_trait]
impl DiagnosticsSink for NoopDiagnostics {
    async fn write(&self, _prefix: &str, _screenshot: Option<&[u8]>, _markup: &str) {}
}
