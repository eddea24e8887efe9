//! Run the mart models over hand-written raw rows and check the tier,
//! calendar and zero-sales rules the warehouse computes

use rp_core::{Entity, SchemaConfig};
use rp_db::{CellValue, Database, DuckDbBackend, QueryResult};
use rp_transform::{compile, ModelCatalog, ModelRunner, RunStatus};
use std::collections::HashMap;

const STORES: &str = "INSERT INTO raw.stores VALUES
    (1, 'Main Street', 'Supermarket', 'Austin', 'TX', 'USA', '2020-06-15', 20000),
    (2, 'Quiet Corner', 'Express', 'Reno', 'NV', 'USA', '2022-01-01', 5000)";

const PRODUCTS: &str = "INSERT INTO raw.products VALUES
    (1, 'Acme Laptop', 'Electronics', 'Computers', 'Acme', 50.00, 100.00, 'Acme Supply', '2023-01-01'),
    (2, 'Acme Shirt', 'Clothing', 'Tops', 'Acme', 5.00, 10.00, 'Acme Supply', '2023-01-01'),
    (3, 'Acme Lamp', 'Home', 'Lighting', 'Acme', 20.00, 40.00, 'Acme Supply', '2023-01-01'),
    (4, 'Acme Ball', 'Sports', 'Outdoor', 'Acme', 3.00, 6.00, 'Acme Supply', '2023-01-01')";

const CUSTOMERS: &str = "INSERT INTO raw.customers VALUES
    (1, 'Ada', 'Lovelace', 'ada@example.com', '555-0100', '1 Main St', 'Austin', 'TX', '78701', '2022-01-01', 'Premium', true),
    (2, 'Alan', 'Turing', 'alan@example.com', '555-0101', '2 Main St', 'Austin', 'TX', '78701', '2022-02-01', 'Standard', false),
    (3, 'Grace', 'Hopper', 'grace@example.com', '555-0102', '3 Main St', 'Reno', 'NV', '89501', '2022-03-01', 'Basic', false)";

// 2024-06-29 is a Saturday, 2024-06-25 a Tuesday. Transactions 4 and 5 are
// dropped by staging (zero quantity, negative total).
const TRANSACTIONS: &str = "INSERT INTO raw.transactions VALUES
    (1, 1, '2024-06-29', '18:00:00', 1, 1, 1, 10, 500.00, 0.00, 5000.00, 'Cash'),
    (2, 1, '2024-06-25', '17:59:00', 1, 2, 2, 9, 10.00, 0.00, 90.00, 'Credit Card'),
    (3, 1, '2024-06-26', NULL, 1, 2, 4, 1, 6.00, 0.00, 6.00, 'Cash'),
    (4, 1, '2024-06-27', '10:00:00', 1, 2, 2, 0, 10.00, 0.00, 0.00, 'Cash'),
    (5, 1, '2024-06-27', '10:00:00', 1, 2, 3, 1, 40.00, 0.00, -5.00, 'Cash')";

async fn build_marts(vars: &HashMap<String, serde_yaml::Value>) -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_schema_if_not_exists("raw").await.unwrap();
    for entity in Entity::ALL {
        let columns: Vec<String> = entity
            .raw_columns()
            .iter()
            .map(|(name, ty)| format!("{} {}", name, ty))
            .collect();
        db.execute_batch(&format!(
            "CREATE TABLE raw.{} ({})",
            entity.table_name(),
            columns.join(", ")
        ))
        .await
        .unwrap();
    }
    for insert in [STORES, PRODUCTS, CUSTOMERS, TRANSACTIONS] {
        db.execute_batch(insert).await.unwrap();
    }

    let catalog = ModelCatalog::builtin().unwrap();
    let project = compile(catalog.into_models(), &SchemaConfig::default(), vars).unwrap();
    let results = ModelRunner::new(&db, &project).run(None, |_| {}).await.unwrap();
    for result in &results.results {
        assert_eq!(
            result.status,
            RunStatus::Success,
            "{} failed: {:?}",
            result.model,
            result.error
        );
    }
    db
}

async fn row(db: &DuckDbBackend, sql: &str) -> QueryResult {
    let rows = db.query_rows(sql).await.unwrap();
    assert_eq!(rows.len(), 1, "expected one row from {}", sql);
    rows
}

fn text(rows: &QueryResult, column: &str) -> String {
    rows.get(0, column)
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string()
}

fn number(rows: &QueryResult, column: &str) -> Option<f64> {
    rows.get(0, column).and_then(|c| c.as_f64())
}

#[tokio::test]
async fn test_customer_tiers_at_boundary_and_without_sales() {
    let db = build_marts(&HashMap::new()).await;

    let vip = row(
        &db,
        "SELECT lifetime_value, customer_value_tier FROM analytics.dim_customer WHERE customer_id = 1",
    )
    .await;
    assert_eq!(number(&vip, "lifetime_value"), Some(5000.0));
    assert_eq!(text(&vip, "customer_value_tier"), "VIP");

    let low = row(
        &db,
        "SELECT lifetime_value, customer_value_tier FROM analytics.dim_customer WHERE customer_id = 2",
    )
    .await;
    assert_eq!(number(&low, "lifetime_value"), Some(96.0));
    assert_eq!(text(&low, "customer_value_tier"), "Low Value");

    let none = row(
        &db,
        "SELECT lifetime_value, total_transactions, customer_value_tier FROM analytics.dim_customer WHERE customer_id = 3",
    )
    .await;
    assert_eq!(number(&none, "lifetime_value"), Some(0.0));
    assert_eq!(number(&none, "total_transactions"), Some(0.0));
    assert_eq!(text(&none, "customer_value_tier"), "Low Value");
}

#[tokio::test]
async fn test_product_categories_at_unit_boundaries() {
    let db = build_marts(&HashMap::new()).await;

    let expected = [
        (1, 10.0, "Average"),
        (2, 9.0, "Slow Moving"),
        (3, 0.0, "Slow Moving"),
        (4, 1.0, "Slow Moving"),
    ];
    for (product_id, units, category) in expected {
        let rows = row(
            &db,
            &format!(
                "SELECT total_units_sold, total_revenue, performance_category FROM analytics.dim_product WHERE product_id = {}",
                product_id
            ),
        )
        .await;
        assert_eq!(number(&rows, "total_units_sold"), Some(units), "product {}", product_id);
        assert_eq!(text(&rows, "performance_category"), category, "product {}", product_id);
    }

    let unsold = row(
        &db,
        "SELECT total_revenue FROM analytics.dim_product WHERE product_id = 3",
    )
    .await;
    assert_eq!(number(&unsold, "total_revenue"), Some(0.0));
}

#[tokio::test]
async fn test_store_without_sales_and_store_age() {
    let db = build_marts(&HashMap::new()).await;

    let main = row(
        &db,
        "SELECT total_revenue, store_age_years, store_performance_tier FROM analytics.dim_store WHERE store_id = 1",
    )
    .await;
    assert_eq!(number(&main, "total_revenue"), Some(5096.0));
    // Aged against the latest sale, 2024-06-29
    assert_eq!(number(&main, "store_age_years"), Some(4.0));
    assert_eq!(text(&main, "store_performance_tier"), "Low Performing");

    let quiet = row(
        &db,
        "SELECT total_revenue, unique_customers, store_age_years, store_performance_tier FROM analytics.dim_store WHERE store_id = 2",
    )
    .await;
    assert_eq!(number(&quiet, "total_revenue"), Some(0.0));
    assert_eq!(number(&quiet, "unique_customers"), Some(0.0));
    assert_eq!(number(&quiet, "store_age_years"), Some(2.0));
    assert_eq!(text(&quiet, "store_performance_tier"), "Low Performing");
}

#[tokio::test]
async fn test_store_age_uses_as_of_date_var() {
    let mut vars = HashMap::new();
    vars.insert(
        "as_of_date".to_string(),
        serde_yaml::Value::String("2030-01-01".to_string()),
    );
    let db = build_marts(&vars).await;

    let main = row(
        &db,
        "SELECT store_age_years FROM analytics.dim_store WHERE store_id = 1",
    )
    .await;
    assert_eq!(number(&main, "store_age_years"), Some(10.0));
}

#[tokio::test]
async fn test_fact_calendar_columns() {
    let db = build_marts(&HashMap::new()).await;

    assert_eq!(
        db.query_count("SELECT * FROM analytics.fact_sales").await.unwrap(),
        3
    );

    let saturday = row(
        &db,
        "SELECT day_type, time_of_day FROM analytics.fact_sales WHERE transaction_id = 1",
    )
    .await;
    assert_eq!(text(&saturday, "day_type"), "Weekend");
    assert_eq!(text(&saturday, "time_of_day"), "Evening");

    let tuesday = row(
        &db,
        "SELECT day_type, time_of_day FROM analytics.fact_sales WHERE transaction_id = 2",
    )
    .await;
    assert_eq!(text(&tuesday, "day_type"), "Weekday");
    assert_eq!(text(&tuesday, "time_of_day"), "Afternoon");

    let untimed = row(
        &db,
        "SELECT time_of_day FROM analytics.fact_sales WHERE transaction_id = 3",
    )
    .await;
    assert_eq!(untimed.get(0, "time_of_day"), Some(&CellValue::Null));
}
