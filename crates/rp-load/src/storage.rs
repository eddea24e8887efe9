//! Date-partitioned object storage for raw files
//!
//! Keys follow `<prefix>/<entity>/date=YYYY-MM-DD/<entity>.csv`. Dimension
//! files are partitioned by load date, transaction files keep the partition
//! of the day they were generated for.

use crate::error::{LoadError, LoadResult};
use chrono::NaiveDate;
use futures::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use rp_core::Entity;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const PARTITION_KEY: &str = "date=";

/// An object in the raw store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedObject {
    /// Full object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// Entity the file holds
    pub entity: Entity,
    /// Partition date from the key
    pub partition: NaiveDate,
}

/// Object store holding raw CSV files, backed by a local directory
#[derive(Debug)]
pub struct RawStore {
    store: LocalFileSystem,
    root: PathBuf,
    prefix: String,
}

impl RawStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: &Path, prefix: &str) -> LoadResult<Self> {
        std::fs::create_dir_all(root).map_err(|source| LoadError::Io {
            path: root.display().to_string(),
            source,
        })?;
        let root = root.canonicalize().map_err(|source| LoadError::Io {
            path: root.display().to_string(),
            source,
        })?;
        let store = LocalFileSystem::new_with_prefix(&root)?;

        Ok(Self {
            store,
            root,
            prefix: prefix.trim_matches('/').to_string(),
        })
    }

    /// Directory backing the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Key prefix for raw files
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key prefix of one entity, e.g. `raw/stores`
    pub fn entity_prefix(&self, entity: Entity) -> String {
        if self.prefix.is_empty() {
            entity.table_name().to_string()
        } else {
            format!("{}/{}", self.prefix, entity.table_name())
        }
    }

    /// Object key of an entity file in a partition
    pub fn object_key(&self, entity: Entity, partition: NaiveDate) -> ObjectPath {
        ObjectPath::from(format!(
            "{}/{}{}/{}",
            self.entity_prefix(entity),
            PARTITION_KEY,
            partition.format("%Y-%m-%d"),
            entity.file_name()
        ))
    }

    /// Local path of an object, readable by the warehouse
    pub fn local_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Glob matching every partition of an entity
    pub fn partition_glob(&self, entity: Entity) -> PathBuf {
        self.local_path(&format!(
            "{}/{}*/{}",
            self.entity_prefix(entity),
            PARTITION_KEY,
            entity.file_name()
        ))
    }

    /// Put one local file under `key`, overwriting any existing object
    pub async fn upload_file(&self, local: &Path, key: &ObjectPath) -> LoadResult<u64> {
        let bytes = tokio::fs::read(local)
            .await
            .map_err(|source| LoadError::Io {
                path: local.display().to_string(),
                source,
            })?;
        let size = bytes.len() as u64;
        self.store.put(key, PutPayload::from(bytes)).await?;
        log::debug!("Uploaded {} ({} bytes)", key, size);
        Ok(size)
    }

    /// Upload every generated file in `data_dir`.
    ///
    /// Row-date partitioned entities are replaced as a whole: stored
    /// partitions that are not part of this batch are deleted.
    pub async fn upload_data_dir(
        &self,
        data_dir: &Path,
        load_date: NaiveDate,
    ) -> LoadResult<Vec<UploadedObject>> {
        let mut uploaded = Vec::new();
        for (entity, partition, local) in discover_files(data_dir, load_date)? {
            let key = self.object_key(entity, partition);
            let size = self.upload_file(&local, &key).await?;
            uploaded.push(UploadedObject {
                key: key.to_string(),
                size,
                entity,
                partition,
            });
        }

        for entity in Entity::ALL.into_iter().filter(Entity::partitioned_by_row_date) {
            let batch: HashSet<&str> = uploaded
                .iter()
                .filter(|o| o.entity == entity)
                .map(|o| o.key.as_str())
                .collect();
            if !batch.is_empty() {
                self.prune_partitions(entity, &batch).await?;
            }
        }

        log::info!(
            "Uploaded {} files from {} to {}",
            uploaded.len(),
            data_dir.display(),
            self.root.display()
        );
        Ok(uploaded)
    }

    /// Delete stored partitions of `entity` whose key is not in `keep`
    pub async fn prune_partitions(
        &self,
        entity: Entity,
        keep: &HashSet<&str>,
    ) -> LoadResult<usize> {
        let mut pruned = 0;
        for object in self.list(Some(entity)).await? {
            if keep.contains(object.key.as_str()) {
                continue;
            }
            self.store.delete(&ObjectPath::from(object.key.as_str())).await?;
            log::debug!("Removed stale partition {}", object.key);
            pruned += 1;
        }
        if pruned > 0 {
            log::info!("Removed {} stale {} partitions", pruned, entity);
        }
        Ok(pruned)
    }

    /// List stored raw files, optionally for one entity, sorted by key
    pub async fn list(&self, entity: Option<Entity>) -> LoadResult<Vec<UploadedObject>> {
        let prefix = match entity {
            Some(entity) => Some(self.entity_prefix(entity)),
            None if self.prefix.is_empty() => None,
            None => Some(self.prefix.clone()),
        };
        let prefix = prefix.map(ObjectPath::from);

        let metas = self
            .store
            .list(prefix.as_ref())
            .try_collect::<Vec<_>>()
            .await?;

        let mut objects: Vec<UploadedObject> = metas
            .into_iter()
            .filter_map(|meta| {
                let key = meta.location.to_string();
                let (entity, partition) = self.parse_key(&key)?;
                Some(UploadedObject {
                    key,
                    size: meta.size,
                    entity,
                    partition,
                })
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    /// Entity and partition of a key under this store's prefix
    fn parse_key(&self, key: &str) -> Option<(Entity, NaiveDate)> {
        let rest = if self.prefix.is_empty() {
            key
        } else {
            key.strip_prefix(&self.prefix)?.strip_prefix('/')?
        };
        let mut parts = rest.split('/');
        let entity = Entity::from_table_name(parts.next()?)?;
        let partition = parse_partition(parts.next()?)?;
        if parts.next()? != entity.file_name() {
            return None;
        }
        Some((entity, partition))
    }
}

/// Parse a `date=YYYY-MM-DD` key segment
pub fn parse_partition(segment: &str) -> Option<NaiveDate> {
    let date = segment.strip_prefix(PARTITION_KEY)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Generated files in `data_dir` with the partition each belongs to
fn discover_files(
    data_dir: &Path,
    load_date: NaiveDate,
) -> LoadResult<Vec<(Entity, NaiveDate, PathBuf)>> {
    let mut files = Vec::new();

    for entity in Entity::ALL {
        if entity.partitioned_by_row_date() {
            let dir = data_dir.join(entity.table_name());
            if !dir.is_dir() {
                log::warn!("No {} directory in {}", entity, data_dir.display());
                continue;
            }
            let entries = std::fs::read_dir(&dir).map_err(|source| LoadError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let mut partitions: Vec<(NaiveDate, PathBuf)> = entries
                .flatten()
                .filter_map(|entry| {
                    let name = entry.file_name();
                    let partition = parse_partition(name.to_str()?)?;
                    let file = entry.path().join(entity.file_name());
                    file.is_file().then_some((partition, file))
                })
                .collect();
            partitions.sort();
            files.extend(
                partitions
                    .into_iter()
                    .map(|(partition, file)| (entity, partition, file)),
            );
        } else {
            let file = data_dir.join(entity.file_name());
            if file.is_file() {
                files.push((entity, load_date, file));
            } else {
                log::warn!("No {} in {}", entity.file_name(), data_dir.display());
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
