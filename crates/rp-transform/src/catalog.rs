//! The set of models to compile: the built-in staging and mart models, or a
//! project's own `models/` directory

use crate::error::{TransformError, TransformResult};
use rp_core::{CoreError, Model};
use std::collections::BTreeMap;
use std::path::Path;

/// Name, SQL template and schema YAML of a built-in model
type BuiltinModel = (&'static str, &'static str, &'static str);

const BUILTIN_MODELS: [BuiltinModel; 8] = [
    (
        "stg_stores",
        include_str!("../models/staging/stg_stores.sql"),
        include_str!("../models/staging/stg_stores.yml"),
    ),
    (
        "stg_products",
        include_str!("../models/staging/stg_products.sql"),
        include_str!("../models/staging/stg_products.yml"),
    ),
    (
        "stg_customers",
        include_str!("../models/staging/stg_customers.sql"),
        include_str!("../models/staging/stg_customers.yml"),
    ),
    (
        "stg_transactions",
        include_str!("../models/staging/stg_transactions.sql"),
        include_str!("../models/staging/stg_transactions.yml"),
    ),
    (
        "fact_sales",
        include_str!("../models/marts/fact_sales.sql"),
        include_str!("../models/marts/fact_sales.yml"),
    ),
    (
        "dim_customer",
        include_str!("../models/marts/dim_customer.sql"),
        include_str!("../models/marts/dim_customer.yml"),
    ),
    (
        "dim_product",
        include_str!("../models/marts/dim_product.sql"),
        include_str!("../models/marts/dim_product.yml"),
    ),
    (
        "dim_store",
        include_str!("../models/marts/dim_store.sql"),
        include_str!("../models/marts/dim_store.yml"),
    ),
];

/// Directory name searched for project models
pub const MODELS_DIR: &str = "models";

/// Models keyed by name
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: BTreeMap<String, Model>,
}

impl ModelCatalog {
    /// The built-in pipeline models
    pub fn builtin() -> TransformResult<Self> {
        let mut catalog = Self::default();
        for (name, sql, schema) in BUILTIN_MODELS {
            catalog.insert(Model::from_sources(name, sql, Some(schema))?)?;
        }
        Ok(catalog)
    }

    /// Models from `<project>/models` when that directory exists, otherwise
    /// the built-in ones
    pub fn for_project(project_dir: &Path) -> TransformResult<Self> {
        let dir = project_dir.join(MODELS_DIR);
        if dir.is_dir() {
            log::info!("Loading models from {}", dir.display());
            Self::from_dir(&dir)
        } else {
            Self::builtin()
        }
    }

    /// Discover `*.sql` files (with an optional sibling `.yml`) under `dir`
    pub fn from_dir(dir: &Path) -> TransformResult<Self> {
        let mut catalog = Self::default();
        catalog.discover_recursive(dir)?;
        Ok(catalog)
    }

    fn discover_recursive(&mut self, dir: &Path) -> TransformResult<()> {
        let entries = std::fs::read_dir(dir).map_err(|source| TransformError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.discover_recursive(&path)?;
                continue;
            }
            if !path.extension().is_some_and(|ext| ext == "sql") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let sql = read(&path)?;
            let yml_path = path.with_extension("yml");
            let schema = if yml_path.is_file() {
                Some(read(&yml_path)?)
            } else {
                None
            };
            self.insert(Model::from_sources(name, &sql, schema.as_deref())?)?;
        }
        Ok(())
    }

    fn insert(&mut self, model: Model) -> TransformResult<()> {
        let name = model.name.to_string();
        if self.models.contains_key(&name) {
            return Err(CoreError::DuplicateModel { name }.into());
        }
        self.models.insert(name, model);
        Ok(())
    }

    /// Model names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Look up a model
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Number of models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalog holds no models
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Take ownership of the models
    pub fn into_models(self) -> Vec<Model> {
        self.models.into_values().collect()
    }
}

fn read(path: &Path) -> TransformResult<String> {
    std::fs::read_to_string(path).map_err(|source| TransformError::Io {
        path: path.display().to_string(),
        source,
    })
}
