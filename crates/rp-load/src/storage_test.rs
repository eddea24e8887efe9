use super::*;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A data dir with one store file and two transaction partitions
fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("stores.csv"), "store_id\n1\n");
    write(
        &dir.path().join("transactions/date=2024-06-01/transactions.csv"),
        "transaction_id\n1\n",
    );
    write(
        &dir.path().join("transactions/date=2024-06-02/transactions.csv"),
        "transaction_id\n2\n3\n",
    );
    write(&dir.path().join("transactions/notes.txt"), "ignored");
    dir
}

#[test]
fn test_object_key_layout() {
    let root = TempDir::new().unwrap();
    let store = RawStore::open(root.path(), "/raw/").unwrap();
    assert_eq!(store.prefix(), "raw");
    assert_eq!(
        store.object_key(Entity::Store, date(2024, 6, 1)).to_string(),
        "raw/stores/date=2024-06-01/stores.csv"
    );

    let bare = RawStore::open(root.path(), "").unwrap();
    assert_eq!(
        bare.object_key(Entity::Transaction, date(2024, 1, 9))
            .to_string(),
        "transactions/date=2024-01-09/transactions.csv"
    );
}

#[test]
fn test_parse_partition() {
    assert_eq!(parse_partition("date=2024-06-01"), Some(date(2024, 6, 1)));
    assert_eq!(parse_partition("date=june"), None);
    assert_eq!(parse_partition("2024-06-01"), None);
}

#[test]
fn test_partition_glob_is_under_root() {
    let root = TempDir::new().unwrap();
    let store = RawStore::open(root.path(), "raw").unwrap();
    let glob = store.partition_glob(Entity::Transaction);
    assert!(glob.starts_with(store.root()));
    assert!(glob.ends_with("raw/transactions/date=*/transactions.csv"));
}

#[tokio::test]
async fn test_upload_data_dir_partitions_files() {
    let data = data_dir();
    let root = TempDir::new().unwrap();
    let store = RawStore::open(root.path(), "raw").unwrap();

    let uploaded = store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();

    let keys: Vec<&str> = uploaded.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "raw/stores/date=2024-06-03/stores.csv",
            "raw/transactions/date=2024-06-01/transactions.csv",
            "raw/transactions/date=2024-06-02/transactions.csv",
        ]
    );
    assert_eq!(uploaded[0].size, "store_id\n1\n".len() as u64);
    assert!(store
        .local_path("raw/stores/date=2024-06-03/stores.csv")
        .is_file());
}

#[tokio::test]
async fn test_list_and_overwrite() {
    let data = data_dir();
    let root = TempDir::new().unwrap();
    let store = RawStore::open(root.path(), "raw").unwrap();

    store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();
    // Same load date twice overwrites rather than duplicates
    store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 4))
        .await
        .unwrap();

    let all = store.list(None).await.unwrap();
    assert_eq!(all.len(), 4);

    let stores = store.list(Some(Entity::Store)).await.unwrap();
    let partitions: Vec<NaiveDate> = stores.iter().map(|o| o.partition).collect();
    assert_eq!(partitions, vec![date(2024, 6, 3), date(2024, 6, 4)]);
    assert!(stores.iter().all(|o| o.entity == Entity::Store));

    assert!(store.list(Some(Entity::Customer)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_removes_transaction_partitions_missing_from_batch() {
    let data = data_dir();
    let root = TempDir::new().unwrap();
    let store = RawStore::open(root.path(), "raw").unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();

    std::fs::remove_dir_all(data.path().join("transactions")).unwrap();
    write(
        &data.path().join("transactions/date=2024-06-05/transactions.csv"),
        "transaction_id\n1\n",
    );
    store
        .upload_data_dir(data.path(), date(2024, 6, 5))
        .await
        .unwrap();

    let transactions = store.list(Some(Entity::Transaction)).await.unwrap();
    let partitions: Vec<NaiveDate> = transactions.iter().map(|o| o.partition).collect();
    assert_eq!(partitions, vec![date(2024, 6, 5)]);
    assert!(!store
        .local_path("raw/transactions/date=2024-06-01/transactions.csv")
        .exists());

    // Dimension partitions are kept; the loader picks the latest
    assert_eq!(store.list(Some(Entity::Store)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_without_transactions_keeps_stored_partitions() {
    let data = data_dir();
    let root = TempDir::new().unwrap();
    let store = RawStore::open(root.path(), "raw").unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 3))
        .await
        .unwrap();

    std::fs::remove_dir_all(data.path().join("transactions")).unwrap();
    store
        .upload_data_dir(data.path(), date(2024, 6, 4))
        .await
        .unwrap();

    assert_eq!(store.list(Some(Entity::Transaction)).await.unwrap().len(), 2);
}
