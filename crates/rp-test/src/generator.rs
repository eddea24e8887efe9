//! Test SQL generation

use rp_core::model::{SchemaTest, TestType};
use rp_core::sql_utils::{escape_sql_string, quote_ident, quote_qualified};
use serde::Serialize;

/// Generate SQL for a unique test
///
/// Returns rows that violate the unique constraint (duplicates).
pub fn generate_unique_test(table: &str, column: &str) -> String {
    let qt = quote_qualified(table);
    let qc = quote_ident(column);
    format!("SELECT {qc}, COUNT(*) as cnt\nFROM {qt}\nGROUP BY {qc}\nHAVING COUNT(*) > 1")
}

/// Generate SQL for a not_null test
///
/// Returns rows where the column is NULL.
pub fn generate_not_null_test(table: &str, column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} IS NULL",
        quote_qualified(table),
        quote_ident(column)
    )
}

/// Generate SQL for a positive test
///
/// Returns rows where the column value is <= 0.
pub fn generate_positive_test(table: &str, column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} <= 0",
        quote_qualified(table),
        quote_ident(column)
    )
}

/// Generate SQL for a non_negative test
///
/// Returns rows where the column value is < 0.
pub fn generate_non_negative_test(table: &str, column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} < 0",
        quote_qualified(table),
        quote_ident(column)
    )
}

/// Generate SQL for an accepted_values test
///
/// Returns rows where the column value is not in the allowed list or is NULL.
/// Numeric values are emitted bare, everything else as a string literal.
pub fn generate_accepted_values_test(table: &str, column: &str, values: &[String]) -> String {
    let values_list = values
        .iter()
        .map(|v| {
            if v.parse::<f64>().is_ok() {
                v.clone()
            } else {
                format!("'{}'", escape_sql_string(v))
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let qt = quote_qualified(table);
    let qc = quote_ident(column);

    format!("SELECT * FROM {qt} WHERE {qc} NOT IN ({values_list}) OR {qc} IS NULL")
}

/// Generate SQL for a relationship test (foreign key validation)
///
/// Returns rows where the column value does not exist in the referenced table.
pub fn generate_relationship_test(
    table: &str,
    column: &str,
    ref_table: &str,
    ref_column: &str,
) -> String {
    let qt = quote_qualified(table);
    let qc = quote_ident(column);
    let qrt = quote_qualified(ref_table);
    let qrc = quote_ident(ref_column);
    format!(
        "SELECT src.{qc}\n\
         FROM {qt} AS src\n\
         WHERE src.{qc} IS NOT NULL\n\
         \x20 AND NOT EXISTS (\n\
         \x20   SELECT 1 FROM {qrt} AS ref_tbl\n\
         \x20   WHERE ref_tbl.{qrc} = src.{qc}\n\
         \x20 )"
    )
}

/// SQL for a `TestType` against a table and column.
///
/// `resolve` maps the `to` model of a relationship test to its relation.
fn generate_sql_for_test_type(
    test_type: &TestType,
    table: &str,
    column: &str,
    resolve: &dyn Fn(&str) -> String,
) -> String {
    match test_type {
        TestType::Unique => generate_unique_test(table, column),
        TestType::NotNull => generate_not_null_test(table, column),
        TestType::Positive => generate_positive_test(table, column),
        TestType::NonNegative => generate_non_negative_test(table, column),
        TestType::AcceptedValues { values } => {
            generate_accepted_values_test(table, column, values)
        }
        TestType::Relationship { to, field } => {
            let ref_column = field.as_deref().unwrap_or(column);
            generate_relationship_test(table, column, &resolve(to), ref_column)
        }
    }
}

/// Where a generated test came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestKind {
    /// Column test declared in a model's YAML
    Schema {
        model: String,
        column: String,
        test_type: TestType,
    },
    /// Standalone assertion
    Singular,
}

/// Test SQL with metadata
#[derive(Debug, Clone)]
pub struct GeneratedTest {
    /// Human-readable test name
    pub name: String,

    /// Origin of the test
    pub kind: TestKind,

    /// SQL returning violating rows
    pub sql: String,
}

impl GeneratedTest {
    /// Create a schema test against the model's relation, resolving
    /// relationship targets with `resolve`
    pub fn from_schema_test(
        test: &SchemaTest,
        relation: &str,
        resolve: impl Fn(&str) -> String,
    ) -> Self {
        Self {
            name: test.name(),
            kind: TestKind::Schema {
                model: test.model.to_string(),
                column: test.column.clone(),
                test_type: test.test_type.clone(),
            },
            sql: generate_sql_for_test_type(&test.test_type, relation, &test.column, &resolve),
        }
    }

    /// Create a singular test from rendered SQL
    pub fn singular(name: &str, sql: String) -> Self {
        Self {
            name: name.to_string(),
            kind: TestKind::Singular,
            sql,
        }
    }

    /// Model under test, for schema tests
    pub fn model(&self) -> Option<&str> {
        match &self.kind {
            TestKind::Schema { model, .. } => Some(model.as_str()),
            TestKind::Singular => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::ModelName;

    fn schema_test(test_type: TestType, model: &str, column: &str) -> SchemaTest {
        SchemaTest {
            test_type,
            column: column.to_string(),
            model: ModelName::new(model),
        }
    }

    #[test]
    fn test_generate_unique_test() {
        let sql = generate_unique_test("staging.stg_stores", "store_id");
        assert!(sql.contains(r#"FROM "staging"."stg_stores""#));
        assert!(sql.contains(r#"GROUP BY "store_id""#));
        assert!(sql.contains("HAVING COUNT(*) > 1"));
    }

    #[test]
    fn test_generate_positive_and_non_negative() {
        let sql = generate_positive_test("fact_sales", "quantity");
        assert!(sql.contains(r#""quantity" <= 0"#));
        let sql = generate_non_negative_test("fact_sales", "total_amount");
        assert!(sql.contains(r#""total_amount" < 0"#));
    }

    #[test]
    fn test_generate_accepted_values_test() {
        let values = vec!["High Value".to_string(), "Kid's".to_string(), "3".to_string()];
        let sql = generate_accepted_values_test("dim_customer", "tier", &values);
        assert!(sql.contains("NOT IN ('High Value', 'Kid''s', 3)"));
        assert!(sql.contains(r#""tier" IS NULL"#));
    }

    #[test]
    fn test_generate_relationship_test() {
        let sql = generate_relationship_test(
            "analytics.fact_sales",
            "store_id",
            "analytics.dim_store",
            "store_id",
        );
        assert!(sql.contains(r#"FROM "analytics"."fact_sales" AS src"#));
        assert!(sql.contains(r#"FROM "analytics"."dim_store" AS ref_tbl"#));
        assert!(sql.contains(r#"ref_tbl."store_id" = src."store_id""#));
        assert!(sql.contains("NOT EXISTS"));
    }

    #[test]
    fn test_schema_test_name_and_relation() {
        let test = schema_test(TestType::NotNull, "stg_customers", "email");
        let generated =
            GeneratedTest::from_schema_test(&test, "staging.stg_customers", |m| m.to_string());
        assert_eq!(generated.name, "not_null_stg_customers_email");
        assert_eq!(generated.model(), Some("stg_customers"));
        assert!(generated
            .sql
            .contains(r#"FROM "staging"."stg_customers" WHERE "email" IS NULL"#));
    }

    #[test]
    fn test_relationship_resolves_target_and_defaults_field() {
        let test = schema_test(
            TestType::Relationship {
                to: "dim_customer".to_string(),
                field: None,
            },
            "fact_sales",
            "customer_id",
        );
        let generated = GeneratedTest::from_schema_test(&test, "analytics.fact_sales", |m| {
            format!("analytics.{}", m)
        });
        assert!(generated
            .sql
            .contains(r#"FROM "analytics"."dim_customer" AS ref_tbl"#));
        assert!(generated
            .sql
            .contains(r#"ref_tbl."customer_id" = src."customer_id""#));
    }

    #[test]
    fn test_singular_has_no_model() {
        let generated = GeneratedTest::singular("assert_x", "SELECT 1".to_string());
        assert_eq!(generated.kind, TestKind::Singular);
        assert!(generated.model().is_none());
    }
}
