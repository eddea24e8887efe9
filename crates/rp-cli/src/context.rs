//! Runtime context for CLI commands

use anyhow::{Context, Result};
use rp_core::Config;
use rp_db::DuckDbBackend;
use rp_load::RawStore;
use rp_transform::{compile, CompiledProject, ModelCatalog};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::commands::common::ExitCode;

/// Directory under the project root where run artifacts are written
pub const TARGET_DIR: &str = "target";

/// Loaded configuration and the resolved target
pub struct RuntimeContext {
    /// Project root
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,

    /// Target from `--target` or `RP_TARGET`
    pub target: Option<String>,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.project_dir);

        let config = match &args.config {
            Some(path) => {
                Config::load(Path::new(path)).context("Failed to load configuration file")?
            }
            None => Config::load_or_default(&root).context("Failed to load project configuration")?,
        };

        let target = Config::resolve_target(args.target.as_deref());
        if let Some(name) = &target {
            config
                .get_database_config(Some(name))
                .context("Failed to resolve target")?;
        }

        Ok(Self {
            root,
            config,
            target,
        })
    }

    /// Template variables with target overrides applied
    pub fn vars(&self) -> HashMap<String, serde_yaml::Value> {
        self.config
            .get_merged_vars(self.target.as_deref())
            .into_owned()
    }

    /// Directory generated files are written to and uploaded from
    pub fn data_dir(&self) -> PathBuf {
        self.config.data_dir_absolute(&self.root)
    }

    /// Path of a run artifact under the target directory
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.root.join(TARGET_DIR).join(file_name)
    }

    /// Open the object store for raw files
    pub fn raw_store(&self) -> Result<RawStore> {
        let root = self.config.storage_root_absolute(&self.root);
        RawStore::open(&root, &self.config.storage.prefix)
            .with_context(|| format!("Failed to open object storage at {}", root.display()))
    }

    /// Connect to the warehouse of the resolved target.
    ///
    /// Relative database paths are resolved against the project root.
    pub fn open_database(&self) -> Result<DuckDbBackend> {
        let db_config = self
            .config
            .get_database_config(self.target.as_deref())
            .context("Failed to get database configuration")?;

        let path = if db_config.path == ":memory:" || Path::new(&db_config.path).is_absolute() {
            db_config.path.clone()
        } else {
            self.root.join(&db_config.path).display().to_string()
        };
        log::debug!("Opening warehouse at {}", path);

        DuckDbBackend::new(&path).map_err(|e| {
            eprintln!("✗ Failed to connect to database: {}", e);
            ExitCode(4).into()
        })
    }

    /// Compile the project's models (or the built-in ones)
    pub fn compile_project(&self) -> Result<CompiledProject> {
        let catalog = ModelCatalog::for_project(&self.root).context("Failed to load models")?;
        compile(catalog.into_models(), &self.config.schemas, &self.vars())
            .context("Failed to compile models")
    }
}
