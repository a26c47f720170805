//! Ordered DOM-extraction heuristics with fallback.
//!
//! Results-page markup drifts constantly, so extraction is a chain of
//! named strategies rather than a single brittle selector: most-structured
//! selectors first, down to a last-resort anchor scan. Each strategy is a
//! pure function over the parsed document; the chain stops at the first
//! strategy producing at least one normalised result. A strategy that
//! errors counts as "produced nothing" and the chain moves on. Exhausting
//! every strategy yields an empty list, never an error.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, SearchError};
use crate::types::RawResult;

/// One extraction heuristic.
struct Strategy {
    name: &'static str,
    run: fn(&Html, usize) -> Result<Vec<RawResult>>,
}

/// Strategies in priority order.
const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "classic-blocks",
        run: classic_blocks,
    },
    Strategy {
        name: "tagged-results",
        run: tagged_results,
    },
    Strategy {
        name: "heading-link-walk",
        run: heading_link_walk,
    },
    Strategy {
        name: "anchor-scan",
        run: anchor_scan,
    },
];

/// Run the strategy chain over a rendered markup snapshot.
pub(crate) fn run_chain(html: &str, limit: usize) -> Vec<RawResult> {
    let document = Html::parse_document(html);
    run_with(STRATEGIES, &document, limit)
}

fn run_with(strategies: &[Strategy], document: &Html, limit: usize) -> Vec<RawResult> {
    for strategy in strategies {
        match (strategy.run)(document, limit) {
            Ok(results) => {
                let normalised = normalise(results, limit);
                if !normalised.is_empty() {
                    tracing::debug!(
                        strategy = strategy.name,
                        count = normalised.len(),
                        "extraction strategy matched"
                    );
                    return normalised;
                }
            }
            Err(err) => {
                tracing::warn!(strategy = strategy.name, error = %err, "extraction strategy failed");
            }
        }
    }
    tracing::debug!("all extraction strategies produced nothing");
    Vec::new()
}

/// Trim every field, drop entries missing a title or URL, unwrap engine
/// redirect wrappers, and slice to `limit`.
pub(crate) fn normalise(results: Vec<RawResult>, limit: usize) -> Vec<RawResult> {
    results
        .into_iter()
        .filter_map(|r| {
            let title = r.title.trim().to_string();
            let snippet = r.snippet.trim().to_string();
            let url = resolve_url(r.url.trim())?;
            if title.is_empty() {
                return None;
            }
            Some(RawResult {
                title,
                url,
                snippet,
            })
        })
        .take(limit)
        .collect()
}

/// Unwrap Google's `/url?q=` redirect wrapper, passing other hrefs through.
fn resolve_url(href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    let wrapped = href
        .strip_prefix("/url?")
        .or_else(|| href.strip_prefix("https://www.google.com/url?"));
    if let Some(query) = wrapped {
        let parsed = Url::parse(&format!("https://www.google.com/url?{query}")).ok()?;
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned());
    }
    Some(href.to_string())
}

fn sel(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| SearchError::Parse(format!("invalid selector {selector}: {e:?}")))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Classic result blocks: `div.g` containers with an `h3` title, an anchor,
/// and one of the known snippet classes.
fn classic_blocks(document: &Html, _limit: usize) -> Result<Vec<RawResult>> {
    let block_sel = sel("div.g")?;
    let title_sel = sel("h3")?;
    let link_sel = sel("a[href]")?;
    let snippet_sel = sel("div[data-snippet], .VwiC3b, .IsZvec")?;

    let mut results = Vec::new();
    for block in document.select(&block_sel) {
        let title = block
            .select(&title_sel)
            .next()
            .map(text_of)
            .unwrap_or_default();
        let url = block
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(text_of)
            .unwrap_or_default();
        results.push(RawResult {
            title,
            url,
            snippet,
        });
    }
    Ok(results)
}

/// Newer layouts tag each organic result with a `data-testid` attribute.
fn tagged_results(document: &Html, _limit: usize) -> Result<Vec<RawResult>> {
    let block_sel = sel(r#"[data-testid="result"]"#)?;
    let title_sel = sel("h2, h3, .result__title")?;
    let link_sel = sel("a[href]")?;
    let snippet_sel = sel(".result__snippet, .IsZvec, .VwiC3b")?;

    let mut results = Vec::new();
    for block in document.select(&block_sel) {
        let title = block
            .select(&title_sel)
            .next()
            .map(text_of)
            .unwrap_or_default();
        let url = block
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(text_of)
            .unwrap_or_default();
        results.push(RawResult {
            title,
            url,
            snippet,
        });
    }
    Ok(results)
}

/// Walk from each `h3` nested directly inside a results-container anchor up
/// to the anchor itself, then to the nearest `div` ancestor for a snippet.
fn heading_link_walk(document: &Html, _limit: usize) -> Result<Vec<RawResult>> {
    let heading_sel = sel("#search a > h3")?;
    let snippet_sel = sel(".VwiC3b, .IsZvec, .aCOpRe")?;

    let mut results = Vec::new();
    for heading in document.select(&heading_sel) {
        let title = text_of(heading);
        let url = heading
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|el| el.value().name() == "a")
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();
        let snippet = ancestor_div(heading)
            .and_then(|div| div.select(&snippet_sel).next())
            .map(text_of)
            .unwrap_or_default();
        results.push(RawResult {
            title,
            url,
            snippet,
        });
    }
    Ok(results)
}

/// Last resort: every anchor inside the results container, titled by its
/// inner `h3` if present, otherwise by its own text. No snippets.
fn anchor_scan(document: &Html, _limit: usize) -> Result<Vec<RawResult>> {
    let anchor_sel = sel("#search a[href]")?;
    let heading_sel = sel("h3")?;

    let mut results = Vec::new();
    for anchor in document.select(&anchor_sel) {
        let title = anchor
            .select(&heading_sel)
            .next()
            .map(text_of)
            .unwrap_or_else(|| text_of(anchor));
        let url = anchor.value().attr("href").unwrap_or_default().to_string();
        results.push(RawResult {
            title,
            url,
            snippet: String::new(),
        });
    }
    Ok(results)
}

/// Nearest `div` ancestor of an element, if any.
fn ancestor_div<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC_HTML: &str = r#"<html><body><div id="search">
<div class="g">
    <a href="https://www.rust-lang.org/"><h3>Rust Programming Language</h3></a>
    <div class="VwiC3b">A language empowering everyone to build reliable software.</div>
</div>
<div class="g">
    <a href="https://doc.rust-lang.org/book/"><h3>The Rust Book</h3></a>
    <div class="IsZvec">An introductory book about Rust.</div>
</div>
</div></body></html>"#;

    const TAGGED_HTML: &str = r#"<html><body>
<div data-testid="result">
    <a href="https://crates.io/"><h3>crates.io</h3></a>
    <div class="result__snippet">The Rust community crate registry.</div>
</div>
</body></html>"#;

    const WALK_HTML: &str = r#"<html><body><div id="search">
<div class="container">
    <a href="https://blog.rust-lang.org/"><h3>Rust Blog</h3></a>
    <div class="VwiC3b">Official news from the Rust team.</div>
</div>
</div></body></html>"#;

    const ANCHOR_HTML: &str = r#"<html><body><div id="search">
<a href="https://www.rust-lang.org/">Rust Programming Language</a>
<a href="https://doc.rust-lang.org/book/"><h3>The Rust Book</h3></a>
<a href="https://crates.io/">   </a>
</div></body></html>"#;

    #[test]
    fn classic_blocks_extract_title_url_snippet() {
        let results = run_chain(CLASSIC_HTML, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert!(results[0].snippet.contains("reliable software"));
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
    }

    #[test]
    fn tagged_results_matched_when_no_classic_blocks() {
        let results = run_chain(TAGGED_HTML, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "crates.io");
        assert_eq!(results[0].snippet, "The Rust community crate registry.");
    }

    #[test]
    fn heading_walk_finds_anchor_and_sibling_snippet() {
        let results = run_chain(WALK_HTML, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Rust Blog");
        assert_eq!(results[0].url, "https://blog.rust-lang.org/");
        assert_eq!(results[0].snippet, "Official news from the Rust team.");
    }

    #[test]
    fn anchor_scan_output_is_normalised() {
        let results = run_chain(ANCHOR_HTML, 10);
        // The whitespace-only anchor is dropped; the rest keep title + URL.
        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(!r.title.is_empty());
            assert!(!r.url.is_empty());
            assert!(r.snippet.is_empty());
        }
        assert_eq!(results[1].title, "The Rust Book");
    }

    #[test]
    fn anchor_scan_respects_limit() {
        let mut html = String::from(r#"<html><body><div id="search">"#);
        for i in 0..30 {
            html.push_str(&format!(r#"<a href="https://example{i}.com/">Result {i}</a>"#));
        }
        html.push_str("</div></body></html>");

        let results = run_chain(&html, 5);
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].title, "Result 0");
    }

    #[test]
    fn classic_blocks_win_over_anchor_scan() {
        // A page with both structured blocks and loose anchors picks the
        // structured strategy.
        let html = r#"<html><body><div id="search">
            <div class="g"><a href="https://a.com/"><h3>Structured</h3></a></div>
            <a href="https://b.com/">Loose anchor</a>
            </div></body></html>"#;
        let results = run_chain(html, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Structured");
    }

    #[test]
    fn empty_page_yields_empty_list() {
        assert!(run_chain("<html><body></body></html>", 10).is_empty());
        assert!(run_chain("", 10).is_empty());
    }

    #[test]
    fn entries_missing_title_or_url_are_dropped() {
        let results = normalise(
            vec![
                RawResult {
                    title: "  Kept  ".into(),
                    url: " https://kept.com/ ".into(),
                    snippet: " s ".into(),
                },
                RawResult {
                    title: String::new(),
                    url: "https://no-title.com/".into(),
                    snippet: String::new(),
                },
                RawResult {
                    title: "No URL".into(),
                    url: "   ".into(),
                    snippet: String::new(),
                },
            ],
            10,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Kept");
        assert_eq!(results[0].url, "https://kept.com/");
        assert_eq!(results[0].snippet, "s");
    }

    #[test]
    fn google_redirect_wrapper_unwrapped() {
        let results = normalise(
            vec![RawResult {
                title: "Wrapped".into(),
                url: "/url?q=https%3A%2F%2Fexample.com%2Fpage&sa=U".into(),
                snippet: String::new(),
            }],
            10,
        );
        assert_eq!(results[0].url, "https://example.com/page");
    }

    #[test]
    fn absolute_redirect_wrapper_unwrapped() {
        let resolved = resolve_url("https://www.google.com/url?q=https%3A%2F%2Fdocs.rs%2F&ved=1");
        assert_eq!(resolved, Some("https://docs.rs/".to_string()));
    }

    #[test]
    fn direct_urls_pass_through() {
        assert_eq!(
            resolve_url("https://example.com/direct"),
            Some("https://example.com/direct".to_string())
        );
        assert_eq!(resolve_url(""), None);
    }

    #[test]
    fn failing_strategy_is_skipped_not_fatal() {
        fn broken(_document: &Html, _limit: usize) -> Result<Vec<RawResult>> {
            Err(SearchError::Parse("selector exploded".into()))
        }
        fn working(_document: &Html, _limit: usize) -> Result<Vec<RawResult>> {
            Ok(vec![RawResult {
                title: "Fallback".into(),
                url: "https://fallback.com/".into(),
                snippet: String::new(),
            }])
        }
        let strategies = [
            Strategy {
                name: "broken",
                run: broken,
            },
            Strategy {
                name: "working",
                run: working,
            },
        ];
        let document = Html::parse_document("<html></html>");
        let results = run_with(&strategies, &document, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Fallback");
    }

    #[test]
    fn all_strategies_failing_yields_empty_not_error() {
        fn broken(_document: &Html, _limit: usize) -> Result<Vec<RawResult>> {
            Err(SearchError::Parse("selector exploded".into()))
        }
        let strategies = [Strategy {
            name: "broken",
            run: broken,
        }];
        let document = Html::parse_document("<html></html>");
        assert!(run_with(&strategies, &document, 10).is_empty());
    }
}
