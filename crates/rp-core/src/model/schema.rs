//! Schema metadata types for model YAML files

use super::testing::{parse_test_definition, SchemaTest, TestDefinition};
use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use serde::{Deserialize, Serialize};

/// Schema metadata for a single model
///
/// Each model ships a YAML document next to its SQL template
/// (e.g. `fact_sales.sql` + `fact_sales.yml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSchema {
    /// Schema format version
    pub version: u32,

    /// Model description
    #[serde(default)]
    pub description: Option<String>,

    /// Column definitions
    #[serde(default)]
    pub columns: Vec<SchemaColumnDef>,
}

impl Default for ModelSchema {
    fn default() -> Self {
        Self {
            version: 1,
            description: None,
            columns: Vec::new(),
        }
    }
}

impl ModelSchema {
    /// Parse a schema document
    pub fn parse(content: &str) -> CoreResult<Self> {
        let schema: ModelSchema = serde_yaml::from_str(content)?;
        if schema.version != 1 {
            return Err(CoreError::UnsupportedSchemaVersion {
                version: schema.version,
            });
        }
        Ok(schema)
    }

    /// Extract tests from this schema
    ///
    /// Unrecognized test names are skipped with a warning.
    pub fn extract_tests(&self, model_name: &str) -> Vec<SchemaTest> {
        self.columns
            .iter()
            .flat_map(|column| {
                column.tests.iter().filter_map(move |test_def| {
                    let parsed = parse_test_definition(test_def);
                    if parsed.is_none() {
                        log::warn!(
                            "Ignoring unrecognized test on {}.{}: {:?}",
                            model_name,
                            column.name,
                            test_def
                        );
                    }
                    parsed.map(|test_type| SchemaTest {
                        test_type,
                        column: column.name.clone(),
                        model: ModelName::new(model_name),
                    })
                })
            })
            .collect()
    }
}

/// Column definition in a model's schema YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaColumnDef {
    /// Column name
    pub name: String,

    /// SQL data type (e.g., VARCHAR, BIGINT, DECIMAL(12,2))
    #[serde(rename = "type", alias = "data_type", default)]
    pub data_type: Option<String>,

    /// Column description
    #[serde(default)]
    pub description: Option<String>,

    /// Tests to run on this column
    #[serde(default)]
    pub tests: Vec<TestDefinition>,
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
