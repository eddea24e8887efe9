use super::*;
use async_trait::async_trait;
use rp_db::{CellValue, DbError, DbResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Database answering every read with one row and counting the reads
#[derive(Default)]
struct CountingDb {
    reads: AtomicUsize,
    fail: bool,
}

impl CountingDb {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for CountingDb {
    async fn execute(&self, _sql: &str) -> DbResult<usize> {
        Ok(0)
    }

    async fn execute_batch(&self, _sql: &str) -> DbResult<()> {
        Ok(())
    }

    async fn create_table_as(&self, _name: &str, _select: &str, _replace: bool) -> DbResult<()> {
        Ok(())
    }

    async fn create_view_as(&self, _name: &str, _select: &str, _replace: bool) -> DbResult<()> {
        Ok(())
    }

    async fn relation_exists(&self, _name: &str) -> DbResult<bool> {
        Ok(true)
    }

    async fn query_count(&self, _sql: &str) -> DbResult<usize> {
        Ok(1)
    }

    async fn query_rows(&self, sql: &str) -> DbResult<QueryResult> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DbError::ExecutionError(format!("boom: {}", sql)));
        }
        Ok(QueryResult {
            columns: vec!["n".to_string()],
            rows: vec![vec![CellValue::Int(1)]],
        })
    }

    async fn query_sample_rows(&self, _sql: &str, _limit: usize) -> DbResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn drop_if_exists(&self, _name: &str) -> DbResult<()> {
        Ok(())
    }

    async fn create_schema_if_not_exists(&self, _schema: &str) -> DbResult<()> {
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "counting"
    }
}

#[tokio::test]
async fn test_repeated_query_served_from_cache() {
    let db = CountingDb::default();
    let cache = QueryCache::default();

    let first = cache.query(&db, "SELECT 1 AS n").await;
    let second = cache.query(&db, "SELECT 1 AS n").await;

    assert_eq!(db.reads(), 1);
    assert_eq!(first, second);
    assert!(cache.contains("SELECT 1 AS n"));

    cache.query(&db, "SELECT 2 AS n").await;
    assert_eq!(db.reads(), 2);
}

#[tokio::test]
async fn test_entries_expire_after_ttl() {
    let db = CountingDb::default();
    let cache = QueryCache::new(Duration::from_millis(50));

    cache.query(&db, "SELECT 1 AS n").await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    cache.query(&db, "SELECT 1 AS n").await;

    assert_eq!(db.reads(), 2);
}

#[tokio::test]
async fn test_failures_are_empty_and_not_cached() {
    let db = CountingDb::failing();
    let cache = QueryCache::default();

    let result = cache.query(&db, "SELECT broken").await;
    assert!(result.is_empty());
    assert!(!cache.contains("SELECT broken"));

    cache.query(&db, "SELECT broken").await;
    assert_eq!(db.reads(), 2);
}

#[tokio::test]
async fn test_clear() {
    let db = CountingDb::default();
    let cache = QueryCache::default();

    cache.query(&db, "SELECT 1 AS n").await;
    cache.clear();
    cache.query(&db, "SELECT 1 AS n").await;

    assert_eq!(db.reads(), 2);
}
