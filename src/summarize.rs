//! Extractive summarization: per-result summaries and the aggregate synopsis.
//!
//! No language model involved — a summary is the first sentence of the best
//! text available for a result, in order of preference: the results-page
//! snippet, a paragraph fetched from the result URL, the title, and finally
//! a literal marker. The aggregate synopsis keeps the first three sentences
//! of the top summaries.

use futures::future::join_all;

use crate::fetch::PageSummaryFetcher;
use crate::types::{EnrichedResult, RawResult};

/// Marker used when a result yields no usable text at all.
pub const NO_SUMMARY: &str = "No summary available";

/// Minimum character count before a snippet or fetched paragraph is
/// considered substantial enough to summarise.
const MIN_SOURCE_CHARS: usize = 20;

/// Maximum characters kept from a sentence before the ellipsis marker.
const SENTENCE_CAP_CHARS: usize = 200;

/// Type tag stored on every enriched result.
const DEFAULT_RESULT_TYPE: &str = "unknown";

/// Reduces raw results to short summaries and aggregates a synopsis.
#[derive(Debug, Clone)]
pub struct Summarizer {
    fetcher: PageSummaryFetcher,
}

impl Summarizer {
    pub fn new(fetcher: PageSummaryFetcher) -> Self {
        Self { fetcher }
    }

    /// Summarise one raw result.
    ///
    /// A substantial snippet is reduced to its first sentence without any
    /// network traffic. Otherwise the result URL is fetched for a
    /// paragraph; a thin or failed fetch falls back to the title, then to
    /// the [`NO_SUMMARY`] marker. This never fails: fetch errors are
    /// absorbed upstream and collapse to the fallbacks here.
    pub async fn summarize_one(&self, result: &RawResult) -> String {
        if result.snippet.chars().count() > MIN_SOURCE_CHARS {
            return first_sentence(&result.snippet);
        }
        let fetched = self.fetcher.fetch(&result.url).await;
        if fetched.chars().count() > MIN_SOURCE_CHARS {
            return first_sentence(&fetched);
        }
        let title = result.title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
        NO_SUMMARY.to_string()
    }

    /// Summarise every raw result concurrently (fan-out/fan-in) and attach
    /// 1-based positions in extraction order.
    ///
    /// One result per raw input: `enriched.len() == raw.len()`, and
    /// `enriched[i].position == i + 1`. One fetch's failure never cancels
    /// the others.
    pub async fn enrich(&self, raw: Vec<RawResult>) -> Vec<EnrichedResult> {
        let summaries = join_all(raw.iter().map(|r| self.summarize_one(r))).await;
        raw.into_iter()
            .zip(summaries)
            .enumerate()
            .map(|(index, (result, summary))| EnrichedResult {
                position: index + 1,
                title: result.title,
                url: result.url,
                snippet: result.snippet,
                summary,
                result_type: DEFAULT_RESULT_TYPE.to_string(),
            })
            .collect()
    }

    /// Reduce `text` to its first three sentences, joined by single spaces
    /// and trimmed. Empty input yields empty output.
    pub fn aggregate(text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        sentences(text)
            .into_iter()
            .take(3)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// The first sentence of `text`: everything up to and including the first
/// run of terminator characters (`.`, `!`, `?`), capped at
/// [`SENTENCE_CAP_CHARS`] with an ellipsis marker. Text without any
/// terminator is kept whole (and capped).
pub(crate) fn first_sentence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let sentence = sentences(trimmed).into_iter().next().unwrap_or(trimmed);
    cap_sentence(sentence.trim())
}

/// Split `text` into sentences: each is a run of non-terminator characters
/// followed by any run of terminators. Leading terminators are skipped.
fn sentences(text: &str) -> Vec<&str> {
    fn terminator(c: char) -> bool {
        matches!(c, '.' | '!' | '?')
    }

    let mut out = Vec::new();
    let mut rest = text;
    loop {
        let Some(start) = rest.find(|c: char| !terminator(c)) else {
            break;
        };
        let body = &rest[start..];
        let (sentence, consumed) = match body.find(terminator) {
            Some(t) => {
                let tail = &body[t..];
                let run = tail
                    .find(|c: char| !terminator(c))
                    .unwrap_or(tail.len());
                (&body[..t + run], start + t + run)
            }
            None => (body, rest.len()),
        };
        out.push(sentence);
        if consumed >= rest.len() {
            break;
        }
        rest = &rest[consumed..];
    }
    out
}

fn cap_sentence(sentence: &str) -> String {
    if sentence.chars().count() > SENTENCE_CAP_CHARS {
        let capped: String = sentence.chars().take(SENTENCE_CAP_CHARS).collect();
        format!("{capped}...")
    } else {
        sentence.to_string()
    }
}
