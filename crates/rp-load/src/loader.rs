//! Bulk-load raw tables from the object store

use crate::copy::{CopyDefinition, LoadSummary, TableLoad};
use crate::error::{LoadError, LoadResult};
use crate::storage::RawStore;
use rp_core::sql_utils::quote_qualified;
use rp_core::Entity;
use rp_db::Database;
use std::path::PathBuf;

/// Loads stored raw files into the raw schema
pub struct Loader<'a> {
    store: &'a RawStore,
    raw_schema: String,
}

impl<'a> Loader<'a> {
    /// Create a loader reading from `store` into `raw_schema`
    pub fn new(store: &'a RawStore, raw_schema: &str) -> Self {
        Self {
            store,
            raw_schema: raw_schema.to_string(),
        }
    }

    /// Copy definition for an entity.
    ///
    /// Dimensions read their latest partition only; transactions read every
    /// partition.
    pub async fn copy_definition(&self, entity: Entity) -> LoadResult<CopyDefinition> {
        let objects = self.store.list(Some(entity)).await?;

        let latest = objects.iter().map(|o| o.partition).max();
        let Some(latest) = latest else {
            return Err(LoadError::NoFiles {
                entity: entity.to_string(),
                prefix: self.store.entity_prefix(entity),
            });
        };

        if entity.partitioned_by_row_date() {
            let files: Vec<PathBuf> = objects
                .iter()
                .map(|o| self.store.local_path(&o.key))
                .collect();
            Ok(CopyDefinition::new(
                entity,
                &self.raw_schema,
                &self.store.partition_glob(entity),
                files,
            ))
        } else {
            let key = self.store.object_key(entity, latest).to_string();
            let file = self.store.local_path(&key);
            Ok(CopyDefinition::new(
                entity,
                &self.raw_schema,
                &file,
                vec![file.clone()],
            ))
        }
    }

    /// Replace one raw table
    pub async fn load_entity(&self, db: &dyn Database, entity: Entity) -> LoadResult<TableLoad> {
        let copy = self.copy_definition(entity).await?;
        log::debug!("Loading {} from {}", copy.table, copy.source);

        db.execute_batch(&copy.to_sql()).await?;

        let parsed = copy.count_source_rows()?;
        let loaded = db
            .query_count(&format!("SELECT * FROM {}", quote_qualified(&copy.table)))
            .await?;

        let result = TableLoad::new(&copy.table, copy.files.len(), parsed, loaded);
        if result.rejected > 0 {
            log::warn!(
                "{}: {} of {} records rejected",
                result.table,
                result.rejected,
                result.parsed
            );
        }
        Ok(result)
    }

    /// Create the raw schema and replace every raw table
    pub async fn load_all(&self, db: &dyn Database) -> LoadResult<LoadSummary> {
        db.create_schema_if_not_exists(&self.raw_schema).await?;

        let mut summary = LoadSummary::default();
        for entity in Entity::ALL {
            let table = self.load_entity(db, entity).await?;
            log::info!("Loaded {} ({} rows)", table.table, table.loaded);
            summary.tables.push(table);
        }
        Ok(summary)
    }
}
