//! CSV output with an explicit header taken from the raw column layout

use crate::error::{GenerateError, GenerateResult};
use chrono::NaiveDate;
use rp_core::Entity;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Directory holding the transactions of one day, relative to the data dir
pub fn transaction_partition_dir(date: NaiveDate) -> PathBuf {
    PathBuf::from(Entity::Transaction.table_name()).join(format!("date={}", date.format("%Y-%m-%d")))
}

/// Writes one entity CSV file
pub(crate) struct EntityWriter {
    path: PathBuf,
    inner: csv::Writer<File>,
    rows: usize,
}

impl EntityWriter {
    /// Create the file (and parent directories) and write the header
    pub(crate) fn create(path: &Path, entity: Entity) -> GenerateResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|source| GenerateError::Csv {
                path: path.display().to_string(),
                source,
            })?;

        let mut writer = Self {
            path: path.to_path_buf(),
            inner,
            rows: 0,
        };
        let header: Vec<&str> = entity.raw_columns().iter().map(|(name, _)| *name).collect();
        writer.write_raw(&header)?;
        writer.rows = 0;
        Ok(writer)
    }

    fn csv_err(&self, source: csv::Error) -> GenerateError {
        GenerateError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Serialize one typed row
    pub(crate) fn write<T: Serialize>(&mut self, row: &T) -> GenerateResult<()> {
        self.inner.serialize(row).map_err(|e| self.csv_err(e))?;
        self.rows += 1;
        Ok(())
    }

    /// Write a record of raw string fields
    pub(crate) fn write_raw(&mut self, fields: &[&str]) -> GenerateResult<()> {
        self.inner.write_record(fields).map_err(|e| self.csv_err(e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the path and data row count
    pub(crate) fn finish(mut self) -> GenerateResult<(PathBuf, usize)> {
        self.inner.flush().map_err(|source| GenerateError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok((self.path, self.rows))
    }
}
