//! Declarative bulk-load definitions and load accounting

use crate::error::{LoadError, LoadResult};
use rp_core::entity::RawColumn;
use rp_core::sql_utils::{quote_qualified, string_literal};
use rp_core::Entity;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What to load into one raw table and from where
#[derive(Debug, Clone)]
pub struct CopyDefinition {
    /// Entity being loaded
    pub entity: Entity,
    /// Schema-qualified raw table, e.g. `raw.stores`
    pub table: String,
    /// Typed column list in file order
    pub columns: &'static [RawColumn],
    /// File path or glob handed to the CSV reader
    pub source: String,
    /// Files the source resolves to
    pub files: Vec<PathBuf>,
}

impl CopyDefinition {
    /// Definition for an entity loaded into `raw_schema`
    pub fn new(entity: Entity, raw_schema: &str, source: &Path, files: Vec<PathBuf>) -> Self {
        Self {
            entity,
            table: format!("{}.{}", raw_schema, entity.table_name()),
            columns: entity.raw_columns(),
            source: source.display().to_string(),
            files,
        }
    }

    /// The `columns = {...}` struct literal for the CSV reader
    fn columns_literal(&self) -> String {
        let fields = self
            .columns
            .iter()
            .map(|(name, data_type)| format!("{}: {}", string_literal(name), string_literal(data_type)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", fields)
    }

    /// Statement replacing the raw table with the file contents.
    ///
    /// Malformed records are skipped by the reader; partition directories are
    /// not turned into columns.
    pub fn to_sql(&self) -> String {
        format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv({}, header = true, \
             hive_partitioning = false, ignore_errors = true, columns = {})",
            quote_qualified(&self.table),
            string_literal(&self.source),
            self.columns_literal()
        )
    }

    /// Count data records in the source files, well-formed or not
    pub fn count_source_rows(&self) -> LoadResult<usize> {
        let mut total = 0;
        for file in &self.files {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_path(file)
                .map_err(|source| LoadError::Csv {
                    path: file.display().to_string(),
                    source,
                })?;
            total += reader.byte_records().count();
        }
        Ok(total)
    }
}

/// Load outcome of one raw table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    /// Schema-qualified table name
    pub table: String,
    /// Files read
    pub files: usize,
    /// Data records found in the files
    pub parsed: usize,
    /// Rows in the table after the load
    pub loaded: usize,
    /// Records the reader skipped
    pub rejected: usize,
}

impl TableLoad {
    /// Build from the scanned and loaded counts
    pub fn new(table: &str, files: usize, parsed: usize, loaded: usize) -> Self {
        Self {
            table: table.to_string(),
            files,
            parsed,
            loaded,
            rejected: parsed.saturating_sub(loaded),
        }
    }
}

/// Load outcome of every raw table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Per-table results in load order
    pub tables: Vec<TableLoad>,
}

impl LoadSummary {
    /// Rows loaded across all tables
    pub fn total_loaded(&self) -> usize {
        self.tables.iter().map(|t| t.loaded).sum()
    }

    /// Records rejected across all tables
    pub fn total_rejected(&self) -> usize {
        self.tables.iter().map(|t| t.rejected).sum()
    }

    /// Result for one table
    pub fn table(&self, table: &str) -> Option<&TableLoad> {
        self.tables.iter().find(|t| t.table == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_sql_for_stores() {
        let copy = CopyDefinition::new(
            Entity::Store,
            "raw",
            Path::new("/data/raw/stores/date=2024-06-01/stores.csv"),
            vec![],
        );
        let sql = copy.to_sql();
        assert!(sql.starts_with(r#"CREATE OR REPLACE TABLE "raw"."stores" AS SELECT * FROM read_csv('/data/raw/stores/date=2024-06-01/stores.csv'"#));
        assert!(sql.contains("header = true"));
        assert!(sql.contains("ignore_errors = true"));
        assert!(sql.contains("hive_partitioning = false"));
        assert!(sql.contains("columns = {'store_id': 'BIGINT', 'store_name': 'VARCHAR'"));
        assert!(sql.contains("'size_sqft': 'INTEGER'}"));
    }

    #[test]
    fn test_copy_sql_escapes_source() {
        let copy = CopyDefinition::new(Entity::Product, "raw", Path::new("/tmp/o'brien/*.csv"), vec![]);
        assert!(copy.to_sql().contains("read_csv('/tmp/o''brien/*.csv'"));
        assert!(copy.to_sql().contains("'retail_price': 'DECIMAL(10,2)'"));
    }

    #[test]
    fn test_count_source_rows_includes_malformed() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("t.csv");
        std::fs::write(&file, "a,b\n1,2\n3\nx,y,z\n").unwrap();
        let copy = CopyDefinition::new(Entity::Store, "raw", &file, vec![file.clone()]);
        assert_eq!(copy.count_source_rows().unwrap(), 3);
    }

    #[test]
    fn test_rejected_is_parsed_minus_loaded() {
        let load = TableLoad::new("raw.transactions", 3, 10, 8);
        assert_eq!(load.rejected, 2);

        let summary = LoadSummary {
            tables: vec![load, TableLoad::new("raw.stores", 1, 5, 5)],
        };
        assert_eq!(summary.total_loaded(), 13);
        assert_eq!(summary.total_rejected(), 2);
        assert_eq!(summary.table("raw.stores").unwrap().files, 1);
    }
}
