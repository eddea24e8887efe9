//! Query result cache keyed by query text

use moka::sync::Cache;
use rp_db::{Database, QueryResult};
use std::sync::Arc;
use std::time::Duration;

/// Time-to-live of cached query results
pub const CACHE_TTL: Duration = Duration::from_secs(600);

const MAX_ENTRIES: u64 = 1_000;

/// Caches successful query results for a fixed time-to-live.
///
/// Failed queries are logged and answered with an empty result, which is not
/// cached so the next refresh retries.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<String, Arc<QueryResult>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CACHE_TTL)
    }
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cached result for `sql`, querying `db` on a miss
    pub async fn query(&self, db: &dyn Database, sql: &str) -> Arc<QueryResult> {
        if let Some(hit) = self.cache.get(sql) {
            log::debug!("Cache hit ({} rows)", hit.len());
            return hit;
        }

        match db.query_rows(sql).await {
            Ok(result) => {
                let result = Arc::new(result);
                self.cache.insert(sql.to_string(), Arc::clone(&result));
                result
            }
            Err(e) => {
                log::error!("Dashboard query failed: {}", e);
                Arc::new(QueryResult::default())
            }
        }
    }

    /// Whether a live entry exists for `sql`
    pub fn contains(&self, sql: &str) -> bool {
        self.cache.contains_key(sql)
    }

    /// Drop every cached result
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
