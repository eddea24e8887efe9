//! Configuration types and parsing for pipeline.yml

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file names searched in a project directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["pipeline.yml", "pipeline.yaml"];

/// Main project configuration from pipeline.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory the generator writes CSV files into
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Object storage settings for the loader
    #[serde(default)]
    pub storage: StorageConfig,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Warehouse schema names per layer
    #[serde(default)]
    pub schemas: SchemaConfig,

    /// Synthetic data generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Variables available in model templates
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,

    /// Named target configurations (e.g., dev, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Variable overrides (merged with base vars)
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Local directory backing the object store
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Key prefix under which raw files are uploaded
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            prefix: default_storage_prefix(),
        }
    }
}

/// Warehouse schema names for the three layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Unmodified ingested data
    #[serde(default = "default_raw_schema")]
    pub raw: String,

    /// Cleaned views
    #[serde(default = "default_staging_schema")]
    pub staging: String,

    /// Dimensional model
    #[serde(default = "default_analytics_schema")]
    pub analytics: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            raw: default_raw_schema(),
            staging: default_staging_schema(),
            analytics: default_analytics_schema(),
        }
    }
}

impl SchemaConfig {
    /// Schema name for a warehouse layer
    pub fn for_layer(&self, layer: Layer) -> &str {
        match layer {
            Layer::Raw => &self.raw,
            Layer::Staging => &self.staging,
            Layer::Mart => &self.analytics,
        }
    }

    /// All schema names, in layer order
    pub fn all(&self) -> [&str; 3] {
        [&self.raw, &self.staging, &self.analytics]
    }
}

/// Warehouse layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Raw ingested tables
    Raw,
    /// Cleaning views
    Staging,
    /// Fact and dimension tables
    Mart,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Raw => write!(f, "raw"),
            Layer::Staging => write!(f, "staging"),
            Layer::Mart => write!(f, "mart"),
        }
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Layer::Raw),
            "staging" => Ok(Layer::Staging),
            "mart" | "marts" => Ok(Layer::Mart),
            other => Err(format!("unknown layer '{}'", other)),
        }
    }
}

/// Synthetic data generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// RNG seed; the same seed yields the same files
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of stores
    #[serde(default = "default_stores")]
    pub stores: usize,

    /// Number of products, assigned round-robin over the category/subcategory pairs
    #[serde(default = "default_products")]
    pub products: usize,

    /// Number of customers
    #[serde(default = "default_customers")]
    pub customers: usize,

    /// Number of days of transactions
    #[serde(default = "default_days")]
    pub days: u32,

    /// Last day of generated transactions (defaults to today)
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Fraction of rows (0.0 - 1.0) written with defects for the staging layer to clean
    #[serde(default)]
    pub dirty_rate: f64,

    /// Transactions generated per day
    #[serde(default)]
    pub volume: TransactionVolume,
}

/// Inclusive ranges for the number of transactions generated per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionVolume {
    /// Minimum transactions on a weekday
    pub weekday_min: u32,
    /// Maximum transactions on a weekday
    pub weekday_max: u32,
    /// Minimum transactions on a Saturday or Sunday
    pub weekend_min: u32,
    /// Maximum transactions on a Saturday or Sunday
    pub weekend_max: u32,
}

impl Default for TransactionVolume {
    fn default() -> Self {
        Self {
            weekday_min: 300,
            weekday_max: 500,
            weekend_min: 500,
            weekend_max: 800,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            stores: default_stores(),
            products: default_products(),
            customers: default_customers(),
            days: default_days(),
            end_date: None,
            dirty_rate: 0.0,
            volume: TransactionVolume::default(),
        }
    }
}

fn default_name() -> String {
    "retail_pipeline".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_storage_root() -> String {
    "storage".to_string()
}

fn default_storage_prefix() -> String {
    "raw".to_string()
}

fn default_raw_schema() -> String {
    "raw".to_string()
}

fn default_staging_schema() -> String {
    "staging".to_string()
}

fn default_analytics_schema() -> String {
    "analytics".to_string()
}

const DEFAULT_DB_PATH: &str = "warehouse.duckdb";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_stores() -> usize {
    50
}

fn default_products() -> usize {
    500
}

fn default_customers() -> usize {
    10_000
}

fn default_days() -> u32 {
    365
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            data_dir: default_data_dir(),
            storage: StorageConfig::default(),
            database: DatabaseConfig::default(),
            schemas: SchemaConfig::default(),
            generator: GeneratorConfig::default(),
            vars: HashMap::new(),
            targets: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for pipeline.yml or pipeline.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Load configuration from a project directory, falling back to defaults
    /// when no config file exists
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::load_from_dir(dir) {
            Err(CoreError::ConfigNotFound { path }) => {
                log::info!("No config at {}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        let schemas = self.schemas.all();
        for (i, schema) in schemas.iter().enumerate() {
            if schema.is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "Schema names cannot be empty".to_string(),
                });
            }
            if schemas[..i].contains(schema) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Schema '{}' is used by more than one layer", schema),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.generator.dirty_rate) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "generator.dirty_rate must be between 0.0 and 1.0, got {}",
                    self.generator.dirty_rate
                ),
            });
        }

        if self.generator.stores == 0
            || self.generator.customers == 0
            || self.generator.products == 0
        {
            return Err(CoreError::ConfigInvalid {
                message: "generator counts for stores, products and customers must be positive"
                    .to_string(),
            });
        }

        let volume = &self.generator.volume;
        if volume.weekday_min > volume.weekday_max || volume.weekend_min > volume.weekend_max {
            return Err(CoreError::ConfigInvalid {
                message: "generator.volume minimums cannot exceed maximums".to_string(),
            });
        }

        Ok(())
    }

    /// Get absolute data directory relative to a project root
    pub fn data_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }

    /// Get absolute object storage root relative to a project root
    pub fn storage_root_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.storage.root)
    }

    /// Get the list of available target names
    pub fn available_targets(&self) -> Vec<&str> {
        self.targets.keys().map(|s| s.as_str()).collect()
    }

    /// Get database configuration, optionally applying target overrides
    ///
    /// If target is specified and exists, uses target's database config.
    /// Otherwise, uses the base database config.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Get merged variables, with target overrides taking precedence.
    pub fn get_merged_vars(
        &self,
        target: Option<&str>,
    ) -> Cow<'_, HashMap<String, serde_yaml::Value>> {
        let target_config = target.and_then(|name| self.targets.get(name));
        match target_config.filter(|tc| !tc.vars.is_empty()) {
            Some(tc) => {
                let mut vars = self.vars.clone();
                for (key, value) in &tc.vars {
                    vars.insert(key.clone(), value.clone());
                }
                Cow::Owned(vars)
            }
            None => Cow::Borrowed(&self.vars),
        }
    }

    /// Resolve target from CLI flag or RP_TARGET environment variable
    ///
    /// Priority: CLI flag > RP_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var("RP_TARGET").ok())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
