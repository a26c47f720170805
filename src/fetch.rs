//! Secondary page fetches for summarization.
//!
//! When a result carries no usable snippet, the summarizer fetches the
//! result URL itself and pulls a representative paragraph out of the
//! markup. The fetch never fails outward: every network or parse error
//! collapses to an empty string, which the summarizer treats as "nothing
//! usable here".

use scraper::{Html, Selector};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::http;

/// Paragraph selectors in priority order: a main-content region, an
/// article region, then any paragraph at all.
const PARAGRAPH_SELECTORS: &[&str] = &["main p", "article p", "p"];

/// Fetches an arbitrary URL and extracts a representative paragraph.
#[derive(Debug, Clone)]
pub struct PageSummaryFetcher {
    client: reqwest::Client,
}

impl PageSummaryFetcher {
    /// Build a fetcher with a bounded-timeout, browser-like HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Config`] if the client cannot be
    /// constructed.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config)?,
        })
    }

    /// Fetch `url` and return its first representative paragraph, or an
    /// empty string on any failure.
    pub async fn fetch(&self, url: &str) -> String {
        let response = match self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url, error = %e, "page fetch failed");
                return String::new();
            }
        };
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url, error = %e, "page fetch returned error status");
                return String::new();
            }
        };
        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(url, error = %e, "page body read failed");
                return String::new();
            }
        };
        first_paragraph(&html)
    }
}

/// The first non-empty paragraph by selector priority, falling back to the
/// meta description, trimmed. Empty if the page has neither.
pub(crate) fn first_paragraph(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in PARAGRAPH_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    let Ok(meta_sel) = Selector::parse(r#"meta[name="description"]"#) else {
        return String::new();
    };
    document
        .select(&meta_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn main_paragraph_preferred() {
        let html = r#"<html><body>
            <p>Loose paragraph.</p>
            <main><p>Main paragraph.</p></main>
            <article><p>Article paragraph.</p></article>
        </body></html>"#;
        assert_eq!(first_paragraph(html), "Main paragraph.");
    }

    #[test]
    fn article_paragraph_when_no_main() {
        let html = r#"<html><body>
            <p>Loose paragraph.</p>
            <article><p>Article paragraph.</p></article>
        </body></html>"#;
        assert_eq!(first_paragraph(html), "Article paragraph.");
    }

    #[test]
    fn any_paragraph_as_last_selector() {
        let html = "<html><body><div><p>  Only paragraph.  </p></div></body></html>";
        assert_eq!(first_paragraph(html), "Only paragraph.");
    }

    #[test]
    fn empty_paragraphs_skipped() {
        let html = r#"<html><body>
            <main><p>   </p><p>Second, non-empty.</p></main>
        </body></html>"#;
        assert_eq!(first_paragraph(html), "Second, non-empty.");
    }

    #[test]
    fn meta_description_fallback() {
        let html = r#"<html><head>
            <meta name="description" content="  A described page.  ">
        </head><body><div>No paragraphs here.</div></body></html>"#;
        assert_eq!(first_paragraph(html), "A described page.");
    }

    #[test]
    fn nothing_usable_yields_empty() {
        assert_eq!(first_paragraph("<html><body><div>text</div></body></html>"), "");
        assert_eq!(first_paragraph(""), "");
    }

    #[tokio::test]
    async fn fetch_extracts_paragraph_from_served_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><main><p>Served paragraph content.</p></main></body></html>",
            ))
            .mount(&server)
            .await;

        let fetcher = PageSummaryFetcher::new(&SearchConfig::default()).expect("client");
        let text = fetcher.fetch(&format!("{}/page", server.uri())).await;
        assert_eq!(text, "Served paragraph content.");
    }

    #[tokio::test]
    async fn fetch_absorbs_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = PageSummaryFetcher::new(&SearchConfig::default()).expect("client");
        let text = fetcher.fetch(&format!("{}/missing", server.uri())).await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn fetch_absorbs_connection_failure() {
        let fetcher = PageSummaryFetcher::new(&SearchConfig::default()).expect("client");
        // Port 9 is the discard service; nothing listens there in tests.
        let text = fetcher.fetch("http://127.0.0.1:9/unreachable").await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn fetch_falls_back_to_meta_description() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/meta-only"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta name="description" content="Meta summary."></head><body></body></html>"#,
            ))
            .mount(&server)
            .await;

        let fetcher = PageSummaryFetcher::new(&SearchConfig::default()).expect("client");
        let text = fetcher.fetch(&format!("{}/meta-only", server.uri())).await;
        assert_eq!(text, "Meta summary.");
    }
}
