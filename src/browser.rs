//! One isolated headless-Chromium session, launch to teardown.
//!
//! Each scrape drives its own session: launch with a pinned desktop
//! identity (User-Agent, viewport, locale, timezone), optionally install
//! anti-detection countermeasures before any navigation, restore persisted
//! cookies, navigate waiting only for the initial document parse, snapshot
//! the rendered markup, and tear the browser down. There is no session
//! pooling or reuse across requests.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, SetUserAgentOverrideParams, TimeSinceEpoch,
};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::session::CookieRecord;

/// Installed before any page load when countermeasures are requested.
/// Engines probe these signals early to decide whether to serve a
/// challenge: the automation flag, an empty plugin list, and a missing
/// language list all mark a headless session.
const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3] });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
"#;

/// Interval between readiness probes while waiting on the page.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A live browser session bound to a single page.
pub(crate) struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a fresh headless browser and open a blank page.
    ///
    /// With `countermeasures` set, the stealth init script and timezone
    /// override are installed before any navigation can happen.
    pub(crate) async fn launch(config: &SearchConfig, countermeasures: bool) -> Result<Self> {
        let (width, height) = config.viewport;
        let browser_config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(width, height)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--lang={}", config.locale))
            .build()
            .map_err(SearchError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SearchError::Browser(format!("launch failed: {e}")))?;

        // The handler drives the CDP connection and must be polled for the
        // session's lifetime.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SearchError::Browser(format!("new page failed: {e}")))?;

        let ua = match config.user_agent {
            Some(ref custom) => custom.clone(),
            None => http::random_user_agent().to_owned(),
        };
        let ua_override = SetUserAgentOverrideParams::builder()
            .user_agent(ua)
            .accept_language(format!("{},en;q=0.9", config.locale))
            .build()
            .map_err(SearchError::Browser)?;
        page.set_user_agent(ua_override)
            .await
            .map_err(|e| SearchError::Browser(format!("user agent override failed: {e}")))?;

        if countermeasures {
            page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
                .await
                .map_err(|e| SearchError::Browser(format!("stealth script injection failed: {e}")))?;
            if let Err(e) = page
                .execute(SetTimezoneOverrideParams::new(config.timezone.clone()))
                .await
            {
                tracing::warn!(error = %e, "timezone override failed");
            }
        }

        Ok(Self {
            browser,
            page,
            handler: handler_task,
        })
    }

    /// Navigate to `url`, waiting only for the initial document parse
    /// (readyState leaving `loading`), not full subresource load.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Navigation`] if the load fails or the
    /// document does not parse within `timeout`.
    pub(crate) async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(SearchError::Navigation(format!("failed to load {url}: {e}")));
            }
            Err(_) => {
                return Err(SearchError::Navigation(format!(
                    "timed out after {}s loading {url}",
                    timeout.as_secs()
                )));
            }
        }

        while tokio::time::Instant::now() < deadline {
            if self.eval_bool("document.readyState !== 'loading'").await {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Err(SearchError::Navigation(format!(
            "document did not finish parsing within {}s",
            timeout.as_secs()
        )))
    }

    /// Wait up to `timeout` for `selector` to match. Returns whether it
    /// appeared; a missed wait is the caller's signal to proceed anyway.
    pub(crate) async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool {
        let probe = format!("!!document.querySelector({selector:?})");
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.eval_bool(&probe).await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Snapshot the rendered markup.
    pub(crate) async fn html(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| SearchError::Browser(format!("failed to read page content: {e}")))
    }

    /// The page's current URL, empty if unavailable.
    pub(crate) async fn current_url(&self) -> String {
        self.page.url().await.ok().flatten().unwrap_or_default()
    }

    /// Capture a full-page PNG screenshot, best-effort.
    pub(crate) async fn screenshot(&self) -> Option<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        match self.page.screenshot(params).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "screenshot capture failed");
                None
            }
        }
    }

    /// Inject a previously persisted cookie set. Failures are logged and
    /// ignored; the session proceeds cookie-less.
    pub(crate) async fn restore_cookies(&self, cookies: &[CookieRecord]) {
        if cookies.is_empty() {
            return;
        }
        let params: Vec<CookieParam> = cookies
            .iter()
            .filter_map(|c| {
                CookieParam::builder()
                    .name(c.name.clone())
                    .value(c.value.clone())
                    .domain(c.domain.clone())
                    .path(c.path.clone())
                    .secure(c.secure)
                    .http_only(c.http_only)
                    .expires(TimeSinceEpoch::new(c.expires))
                    .build()
                    .ok()
            })
            .collect();
        let count = params.len();
        match self.page.set_cookies(params).await {
            Ok(_) => tracing::debug!(count, "restored cookies into session"),
            Err(e) => tracing::warn!(error = %e, "failed to restore cookies"),
        }
    }

    /// Serialise the session's current cookies, empty on failure.
    pub(crate) async fn export_cookies(&self) -> Vec<CookieRecord> {
        match self.page.get_cookies().await {
            Ok(cookies) => cookies
                .into_iter()
                .map(|c| CookieRecord {
                    name: c.name,
                    value: c.value,
                    domain: c.domain,
                    path: c.path,
                    expires: c.expires,
                    http_only: c.http_only,
                    secure: c.secure,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to export cookies");
                Vec::new()
            }
        }
    }

    /// Tear the session down: close the browser and stop the CDP handler.
    pub(crate) async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!(error = %e, "browser close reported an error");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }

    async fn eval_bool(&self, expression: &str) -> bool {
        match self.page.evaluate(expression).await {
            Ok(value) => value.into_value::<bool>().unwrap_or(false),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stealth_script_covers_probed_signals() {
        assert!(STEALTH_SCRIPT.contains("webdriver"));
        assert!(STEALTH_SCRIPT.contains("plugins"));
        assert!(STEALTH_SCRIPT.contains("languages"));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium installed — run with `cargo test -- --ignored`
    async fn live_launch_and_navigate() {
        let config = SearchConfig::default();
        let session = BrowserSession::launch(&config, true)
            .await
            .expect("launch should work with Chromium installed");

        session
            .navigate("https://example.com", Duration::from_secs(30))
            .await
            .expect("navigation should succeed");

        let html = session.html().await.expect("content should be readable");
        assert!(html.contains("Example Domain"));

        let url = session.current_url().await;
        assert!(url.contains("example.com"));

        session.close().await;
    }
}
