//! Upload and bulk-load generated data into an in-memory warehouse

use chrono::NaiveDate;
use rp_core::config::{GeneratorConfig, TransactionVolume};
use rp_core::Entity;
use rp_db::{Database, DuckDbBackend};
use rp_generate::RetailGenerator;
use rp_load::{LoadError, Loader, RawStore};
use std::path::Path;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn generator_config() -> GeneratorConfig {
    GeneratorConfig {
        seed: 11,
        stores: 3,
        products: 30,
        customers: 12,
        days: 2,
        end_date: Some(date(2024, 6, 2)),
        dirty_rate: 0.0,
        volume: TransactionVolume {
            weekday_min: 3,
            weekday_max: 4,
            weekend_min: 3,
            weekend_max: 4,
        },
    }
}

fn generate(dir: &Path) -> rp_generate::GenerationSummary {
    RetailGenerator::new(generator_config(), date(2024, 6, 2))
        .unwrap()
        .generate_all(dir)
        .unwrap()
}

#[tokio::test]
async fn test_load_generated_data() {
    let data = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let summary = generate(data.path());

    let store = RawStore::open(storage.path(), "raw").unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();

    let db = DuckDbBackend::in_memory().unwrap();
    let loaded = Loader::new(&store, "raw").load_all(&db).await.unwrap();

    assert_eq!(loaded.tables.len(), 4);
    assert_eq!(loaded.total_rejected(), 0);
    assert_eq!(loaded.table("raw.stores").unwrap().loaded, 3);
    assert_eq!(loaded.table("raw.products").unwrap().loaded, 30);
    assert_eq!(loaded.table("raw.customers").unwrap().loaded, 12);

    let transactions = loaded.table("raw.transactions").unwrap();
    assert_eq!(transactions.files, 2);
    assert_eq!(transactions.loaded, summary.line_items);

    // Typed columns, no partition column added
    let rows = db
        .query_rows("SELECT * FROM raw.transactions LIMIT 1")
        .await
        .unwrap();
    assert_eq!(rows.columns.len(), Entity::Transaction.raw_columns().len());
    assert!(rows.column_index("date").is_none());

    let revenue = db
        .query_rows("SELECT SUM(total_amount)::DOUBLE AS revenue FROM raw.transactions")
        .await
        .unwrap();
    let loaded_revenue = revenue.get(0, "revenue").and_then(|v| v.as_f64()).unwrap();
    assert!((loaded_revenue - summary.total_revenue).abs() < 0.01);
}

#[tokio::test]
async fn test_malformed_rows_are_rejected_not_fatal() {
    let data = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    generate(data.path());

    let partition = data
        .path()
        .join("transactions/date=2024-06-01/transactions.csv");
    let mut content = std::fs::read_to_string(&partition).unwrap();
    content.push_str("999,1,2024-06-01,10:00:00,1,1,1,several,1.00,0.00,1.00,Cash\n");
    std::fs::write(&partition, content).unwrap();

    let store = RawStore::open(storage.path(), "raw").unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();

    let db = DuckDbBackend::in_memory().unwrap();
    let loaded = Loader::new(&store, "raw").load_all(&db).await.unwrap();

    let transactions = loaded.table("raw.transactions").unwrap();
    assert_eq!(transactions.rejected, 1);
    assert_eq!(transactions.parsed, transactions.loaded + 1);
    assert_eq!(
        db.query_count("SELECT * FROM raw.transactions WHERE transaction_id = 999")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_dimensions_read_latest_partition() {
    let data = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    generate(data.path());

    let store = RawStore::open(storage.path(), "raw").unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();

    // A later load date carries a single store
    let header = Entity::Store
        .raw_columns()
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(",");
    std::fs::write(
        data.path().join("stores.csv"),
        format!("{}\n42,Late Store,Express,Austin,TX,USA,2020-01-01,6000\n", header),
    )
    .unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 4))
        .await
        .unwrap();

    let db = DuckDbBackend::in_memory().unwrap();
    let loaded = Loader::new(&store, "raw").load_all(&db).await.unwrap();
    assert_eq!(loaded.table("raw.stores").unwrap().loaded, 1);

    let rows = db.query_rows("SELECT store_id FROM raw.stores").await.unwrap();
    assert_eq!(rows.get(0, "store_id").and_then(|v| v.as_i64()), Some(42));
}

#[tokio::test]
async fn test_missing_entity_files() {
    let storage = TempDir::new().unwrap();
    let store = RawStore::open(storage.path(), "raw").unwrap();
    let db = DuckDbBackend::in_memory().unwrap();

    let err = Loader::new(&store, "raw").load_all(&db).await.unwrap_err();
    assert!(matches!(err, LoadError::NoFiles { .. }));
    assert!(err.to_string().contains("[L005]"));
}
