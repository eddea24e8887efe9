//! Model representation

pub mod schema;
pub mod testing;

pub use schema::{ModelSchema, SchemaColumnDef};
pub use testing::{
    parse_test_definition, SchemaTest, SingularTest, TestDefinition, TestParams, TestType,
};

use crate::config::{Layer, SchemaConfig};
use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a model is materialized in the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    /// Create a view
    #[default]
    View,
    /// Create a table
    Table,
}

impl Materialization {
    /// SQL keyword used in `CREATE OR REPLACE <kind>`
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            Materialization::View => "VIEW",
            Materialization::Table => "TABLE",
        }
    }
}

impl std::fmt::Display for Materialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Materialization::View => write!(f, "view"),
            Materialization::Table => write!(f, "table"),
        }
    }
}

impl std::str::FromStr for Materialization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Materialization::View),
            "table" => Ok(Materialization::Table),
            other => Err(format!("unsupported materialization '{}'", other)),
        }
    }
}

/// A SQL model in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Model name
    pub name: ModelName,

    /// Raw SQL content (before Jinja rendering)
    pub raw_sql: String,

    /// Compiled SQL content (after Jinja rendering)
    #[serde(default)]
    pub compiled_sql: Option<String>,

    /// Configuration captured from the `config()` call
    #[serde(default)]
    pub config: ModelConfig,

    /// Dependencies on other models
    #[serde(default)]
    pub depends_on: BTreeSet<ModelName>,

    /// Dependencies on raw source tables
    #[serde(default)]
    pub sources: BTreeSet<String>,

    /// Schema metadata and column tests
    #[serde(default)]
    pub schema: Option<ModelSchema>,
}

/// Configuration for a model extracted from the config() function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Materialization type
    #[serde(default)]
    pub materialized: Option<Materialization>,

    /// Warehouse layer the model belongs to
    #[serde(default)]
    pub layer: Option<Layer>,
}

impl Model {
    /// Create a model from its SQL template and optional schema YAML
    pub fn from_sources(name: &str, raw_sql: &str, schema_yaml: Option<&str>) -> CoreResult<Self> {
        let name = ModelName::try_new(name).ok_or_else(|| CoreError::EmptyName {
            context: "model".into(),
        })?;

        if raw_sql.trim().is_empty() {
            return Err(CoreError::ModelParseError {
                name: name.to_string(),
                message: "SQL template is empty".into(),
            });
        }

        let schema = schema_yaml.map(ModelSchema::parse).transpose()?;

        Ok(Self {
            name,
            raw_sql: raw_sql.to_string(),
            compiled_sql: None,
            config: ModelConfig::default(),
            depends_on: BTreeSet::new(),
            sources: BTreeSet::new(),
            schema,
        })
    }

    /// Materialization, defaulting to a view
    pub fn materialization(&self) -> Materialization {
        self.config.materialized.unwrap_or_default()
    }

    /// Layer, falling back to the `stg_` naming convention
    pub fn layer(&self) -> Layer {
        self.config.layer.unwrap_or_else(|| {
            if self.name.starts_with("stg_") {
                Layer::Staging
            } else {
                Layer::Mart
            }
        })
    }

    /// Schema name the model is materialized into
    pub fn target_schema<'a>(&self, schemas: &'a SchemaConfig) -> &'a str {
        schemas.for_layer(self.layer())
    }

    /// Fully qualified relation name (`schema.model`)
    pub fn qualified_name(&self, schemas: &SchemaConfig) -> String {
        format!("{}.{}", self.target_schema(schemas), self.name)
    }

    /// Tests declared in the model's schema YAML
    pub fn get_schema_tests(&self) -> Vec<SchemaTest> {
        match &self.schema {
            Some(schema) => schema.extract_tests(&self.name),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
