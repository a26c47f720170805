//! Per-engine result scrapers.
//!
//! Google is the primary engine: full countermeasures, cookie persistence,
//! block detection, diagnostic capture. DuckDuckGo is a simpler alternate
//! source invoked only at the caller's discretion — it is not chained
//! automatically on primary failure.

pub mod duckduckgo;
pub mod google;

pub use duckduckgo::DuckDuckGoScraper;
pub use google::GoogleScraper;
