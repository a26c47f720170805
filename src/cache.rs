//! Cache-consistency layer fronting the record store.
//!
//! Lookup selects the most recently created non-expired record for a query;
//! write always inserts a fresh record and never updates one in place.
//! Expiry itself belongs to the store (fixed TTL), not to this layer.

use std::sync::Arc;

use crate::error::Result;
use crate::store::RecordStore;
use crate::types::{EnrichedResult, SearchRecord};

/// Maps a query string to its most recent non-expired [`SearchRecord`].
#[derive(Clone)]
pub struct SearchCache {
    store: Arc<dyn RecordStore>,
}

impl SearchCache {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The newest non-expired record for `query`, by exact string match.
    pub async fn lookup(&self, query: &str) -> Result<Option<SearchRecord>> {
        let hit = self.store.newest_for_query(query).await?;
        match &hit {
            Some(record) => tracing::debug!(query, id = %record.id, "cache hit"),
            None => tracing::trace!(query, "cache miss"),
        }
        Ok(hit)
    }

    /// Persist a completed run as a brand-new record and return it.
    ///
    /// Older records for the same query are left untouched to expire
    /// naturally, which is why [`lookup`](Self::lookup) resolves recency
    /// instead of assuming one record per query.
    pub async fn write(
        &self,
        query: &str,
        results: Vec<EnrichedResult>,
        aggregate_summary: String,
    ) -> Result<SearchRecord> {
        let record = SearchRecord::new(query, results, aggregate_summary);
        self.store.insert(record.clone()).await?;
        tracing::debug!(query, id = %record.id, results = record.results.len(), "record persisted");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache() -> SearchCache {
        SearchCache::new(Arc::new(MemoryStore::new(600)))
    }

    #[tokio::test]
    async fn write_then_lookup_round_trips() {
        let cache = cache();
        let written = cache
            .write("rust", vec![], "A synopsis.".into())
            .await
            .expect("write");

        let found = cache.lookup("rust").await.expect("lookup");
        let found = found.expect("should hit");
        assert_eq!(found.id, written.id);
        assert_eq!(found.aggregate_summary, "A synopsis.");
    }

    #[tokio::test]
    async fn lookup_unknown_query_misses() {
        let cache = cache();
        assert!(cache.lookup("nothing here").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn repeated_writes_insert_new_records() {
        let cache = cache();
        let first = cache.write("rust", vec![], String::new()).await.expect("write");
        let second = cache.write("rust", vec![], String::new()).await.expect("write");
        assert_ne!(first.id, second.id);

        let found = cache
            .lookup("rust")
            .await
            .expect("lookup")
            .expect("should hit");
        assert_eq!(found.id, second.id, "lookup must return the newest record");
    }
}
