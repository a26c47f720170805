//! TTL-backed storage for search records.
//!
//! The store is insert-only: every completed pipeline run creates a fresh
//! record under its own id, and stale records for the same query are left
//! to expire naturally. Expiry is enforced by the storage layer itself via
//! a fixed TTL, never recomputed by cache logic — lookups simply cannot
//! see expired records.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use uuid::Uuid;

use crate::error::Result;
use crate::types::SearchRecord;

/// Maximum number of records held in the in-memory store.
const MAX_STORE_ENTRIES: u64 = 1_000;

/// Durable storage for [`SearchRecord`]s.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Never updates an existing one.
    async fn insert(&self, record: SearchRecord) -> Result<()>;

    /// The most recently created non-expired record for `query`, by exact
    /// string match.
    async fn newest_for_query(&self, query: &str) -> Result<Option<SearchRecord>>;
}

/// In-memory [`RecordStore`] with store-enforced TTL expiry.
///
/// Records are keyed by their unique id, so concurrent runs for the same
/// query coexist; recency is resolved by `created_at` at lookup time.
pub struct MemoryStore {
    records: Cache<Uuid, SearchRecord>,
}

impl MemoryStore {
    /// Build a store whose records expire `ttl_seconds` after insertion.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(MAX_STORE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build(),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: SearchRecord) -> Result<()> {
        tracing::trace!(id = %record.id, query = %record.query, "inserting record");
        self.records.insert(record.id, record).await;
        Ok(())
    }

    async fn newest_for_query(&self, query: &str) -> Result<Option<SearchRecord>> {
        let mut newest: Option<SearchRecord> = None;
        for (_, record) in self.records.iter() {
            if record.query != query {
                continue;
            }
            match &newest {
                Some(current) if current.created_at >= record.created_at => {}
                _ => newest = Some(record),
            }
        }
        Ok(newest)
    }
}
