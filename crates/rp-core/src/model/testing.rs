//! Test types and parsing for model schema tests

use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parse a test definition into a TestType
pub fn parse_test_definition(test_def: &TestDefinition) -> Option<TestType> {
    match test_def {
        TestDefinition::Simple(name) => parse_simple_test(name),
        TestDefinition::Parameterized(map) => {
            let (test_name, params) = map.iter().next()?;
            parse_parameterized_test(test_name, params)
        }
    }
}

fn parse_simple_test(name: &str) -> Option<TestType> {
    match name {
        "unique" => Some(TestType::Unique),
        "not_null" => Some(TestType::NotNull),
        "positive" => Some(TestType::Positive),
        "non_negative" => Some(TestType::NonNegative),
        _ => None,
    }
}

fn parse_parameterized_test(test_name: &str, params: &TestParams) -> Option<TestType> {
    match test_name {
        "accepted_values" => parse_accepted_values(params),
        "relationship" | "relationships" => params.to.clone().map(|to| TestType::Relationship {
            to,
            field: params.field.clone(),
        }),
        _ => None,
    }
}

fn parse_accepted_values(params: &TestParams) -> Option<TestType> {
    let values: Vec<String> = params
        .values
        .iter()
        .filter_map(|v| match v {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(TestType::AcceptedValues { values })
}

/// Column test declared in a model's schema YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaTest {
    /// Test type (unique, not_null, etc.)
    pub test_type: TestType,

    /// Column name to test
    pub column: String,

    /// Model name
    pub model: ModelName,
}

impl SchemaTest {
    /// Display name, e.g. `unique_fact_sales_sale_key`
    pub fn name(&self) -> String {
        format!("{}_{}_{}", self.test_type, self.model, self.column)
    }
}

/// Standalone SQL assertion that should return 0 rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingularTest {
    /// Test name
    pub name: String,

    /// SQL template returning violating rows
    pub sql: String,
}

impl SingularTest {
    /// Create a singular test, rejecting empty SQL
    pub fn new(name: &str, sql: &str) -> CoreResult<Self> {
        if name.is_empty() {
            return Err(CoreError::EmptyName {
                context: "singular test".into(),
            });
        }
        if sql.trim().is_empty() {
            return Err(CoreError::TestValidationError {
                name: name.to_string(),
                message: "Test SQL is empty".to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            sql: sql.to_string(),
        })
    }
}

/// Types of schema tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// Column values must be unique
    Unique,
    /// Column values must not be null
    NotNull,
    /// Column values must be > 0
    Positive,
    /// Column values must be >= 0
    NonNegative,
    /// Column values must be in the allowed list
    AcceptedValues {
        /// List of allowed values
        values: Vec<String>,
    },
    /// Column values must exist in the referenced model
    Relationship {
        /// Referenced model name
        to: String,
        /// Column in the referenced model (defaults to same column name)
        #[serde(default)]
        field: Option<String>,
    },
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestType::Unique => write!(f, "unique"),
            TestType::NotNull => write!(f, "not_null"),
            TestType::Positive => write!(f, "positive"),
            TestType::NonNegative => write!(f, "non_negative"),
            TestType::AcceptedValues { .. } => write!(f, "accepted_values"),
            TestType::Relationship { .. } => write!(f, "relationship"),
        }
    }
}

/// A test definition that can be either a simple string or a parameterized test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestDefinition {
    /// Simple test with no parameters (e.g., "unique", "not_null")
    Simple(String),
    /// Parameterized test (e.g., accepted_values with values list)
    Parameterized(HashMap<String, TestParams>),
}

/// Parameters for parameterized tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParams {
    /// Values for accepted_values test
    #[serde(default)]
    pub values: Vec<serde_yaml::Value>,
    /// Referenced model for relationship tests
    #[serde(default)]
    pub to: Option<String>,
    /// Referenced field for relationship tests
    #[serde(default)]
    pub field: Option<String>,
}

#[cfg(test)]
#[path = "testing_test.rs"]
mod tests;
