//! Assemble the data tests for a compiled project: schema tests from model
//! YAML plus singular assertions rendered against the model relations

use crate::error::{TestGenError, TestGenResult};
use crate::generator::GeneratedTest;
use rp_core::model::SingularTest;
use rp_jinja::{JinjaEnvironment, RelationMap};
use rp_transform::compile::raw_tables;
use rp_transform::CompiledProject;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Directory searched for project assertions
pub const ASSERTIONS_DIR: &str = "assertions";

const BUILTIN_ASSERTIONS: [(&str, &str); 5] = [
    (
        "assert_fact_sales_valid_lines",
        include_str!("../assertions/assert_fact_sales_valid_lines.sql"),
    ),
    (
        "assert_dim_customer_reconciles",
        include_str!("../assertions/assert_dim_customer_reconciles.sql"),
    ),
    (
        "assert_dim_product_reconciles",
        include_str!("../assertions/assert_dim_product_reconciles.sql"),
    ),
    (
        "assert_dim_store_reconciles",
        include_str!("../assertions/assert_dim_store_reconciles.sql"),
    ),
    (
        "assert_tiers_conform",
        include_str!("../assertions/assert_tiers_conform.sql"),
    ),
];

/// Pipeline invariant assertions shipped with the built-in models
pub fn builtin_assertions() -> TestGenResult<Vec<SingularTest>> {
    BUILTIN_ASSERTIONS
        .iter()
        .map(|(name, sql)| SingularTest::new(name, sql).map_err(TestGenError::from))
        .collect()
}

/// `*.sql` assertions in `dir`, named by file stem
pub fn discover_assertions(dir: &Path) -> TestGenResult<Vec<SingularTest>> {
    let io_err = |source| TestGenError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    paths.sort();

    let mut tests = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let sql = std::fs::read_to_string(&path).map_err(|source| TestGenError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tests.push(SingularTest::new(name, &sql)?);
    }
    Ok(tests)
}

/// The tests to run for a project
#[derive(Debug, Clone, Default)]
pub struct TestPlan {
    pub tests: Vec<GeneratedTest>,
}

impl TestPlan {
    /// Schema tests of every model with YAML, followed by the singular
    /// assertions rendered against the project's relations
    pub fn build(
        project: &CompiledProject,
        assertions: &[SingularTest],
        vars: &HashMap<String, serde_yaml::Value>,
    ) -> TestGenResult<Self> {
        let relations = project.relations();
        let resolve = |model: &str| {
            relations
                .get(model)
                .cloned()
                .unwrap_or_else(|| model.to_string())
        };

        let mut tests = Vec::new();
        for compiled in project.models.values() {
            for schema_test in compiled.model.get_schema_tests() {
                tests.push(GeneratedTest::from_schema_test(
                    &schema_test,
                    &compiled.relation,
                    resolve,
                ));
            }
        }

        let env = JinjaEnvironment::new(
            vars,
            RelationMap::resolved(&project.schemas.raw, raw_tables(), relations.clone()),
        );
        for assertion in assertions {
            let sql = env
                .render(&assertion.sql)
                .map_err(|source| TestGenError::Render {
                    name: assertion.name.clone(),
                    source,
                })?;
            tests.push(GeneratedTest::singular(
                &assertion.name,
                sql.trim().to_string(),
            ));
        }

        log::debug!("Planned {} data tests", tests.len());
        Ok(Self { tests })
    }

    /// Built-in assertions plus `<project>/assertions/*.sql` when present
    pub fn for_project(
        project: &CompiledProject,
        project_dir: &Path,
        vars: &HashMap<String, serde_yaml::Value>,
    ) -> TestGenResult<Self> {
        let mut assertions = builtin_assertions()?;
        let dir = project_dir.join(ASSERTIONS_DIR);
        if dir.is_dir() {
            assertions.extend(discover_assertions(&dir)?);
        }
        Self::build(project, &assertions, vars)
    }

    /// Keep only schema tests of the given models; singular assertions span
    /// models and are dropped
    pub fn retain_models(&mut self, models: &HashSet<String>) {
        self.tests
            .retain(|t| t.model().is_some_and(|m| models.contains(m)));
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TestKind;
    use rp_core::SchemaConfig;
    use rp_transform::{compile, ModelCatalog};
    use tempfile::TempDir;

    fn builtin_project() -> CompiledProject {
        let catalog = ModelCatalog::builtin().unwrap();
        compile(catalog.into_models(), &SchemaConfig::default(), &HashMap::new()).unwrap()
    }

    #[test]
    fn test_builtin_assertions_render_against_relations() {
        let project = builtin_project();
        let plan = TestPlan::build(&project, &builtin_assertions().unwrap(), &HashMap::new())
            .unwrap();

        let singular: Vec<&GeneratedTest> = plan
            .tests
            .iter()
            .filter(|t| t.kind == TestKind::Singular)
            .collect();
        assert_eq!(singular.len(), 5);

        let tiers = singular
            .iter()
            .find(|t| t.name == "assert_tiers_conform")
            .unwrap();
        assert!(tiers.sql.contains("FROM analytics.dim_customer"));
        assert!(tiers
            .sql
            .contains("WHEN COALESCE(lifetime_value, 0) >= 5000 THEN 'VIP'"));
        assert!(!tiers.sql.contains("{{"));
    }

    #[test]
    fn test_relationship_tests_use_qualified_targets() {
        let project = builtin_project();
        let plan = TestPlan::build(&project, &[], &HashMap::new()).unwrap();

        let rel = plan
            .tests
            .iter()
            .find(|t| t.name == "relationship_fact_sales_store_id")
            .unwrap();
        assert!(rel.sql.contains(r#"FROM "analytics"."dim_store" AS ref_tbl"#));
        assert!(plan.tests.iter().all(|t| t.kind != TestKind::Singular));
    }

    #[test]
    fn test_retain_models() {
        let project = builtin_project();
        let mut plan =
            TestPlan::build(&project, &builtin_assertions().unwrap(), &HashMap::new()).unwrap();
        let total = plan.len();

        plan.retain_models(&HashSet::from(["stg_stores".to_string()]));
        assert!(plan.len() < total);
        assert!(!plan.is_empty());
        assert!(plan.tests.iter().all(|t| t.model() == Some("stg_stores")));
    }

    #[test]
    fn test_project_assertions_are_added() {
        let dir = TempDir::new().unwrap();
        let assertions = dir.path().join(ASSERTIONS_DIR);
        std::fs::create_dir_all(&assertions).unwrap();
        std::fs::write(
            assertions.join("assert_no_cash.sql"),
            "SELECT * FROM {{ ref('fact_sales') }} WHERE payment_method = 'Cash'",
        )
        .unwrap();
        std::fs::write(assertions.join("README.md"), "not a test").unwrap();

        let project = builtin_project();
        let plan = TestPlan::for_project(&project, dir.path(), &HashMap::new()).unwrap();
        let custom = plan
            .tests
            .iter()
            .find(|t| t.name == "assert_no_cash")
            .unwrap();
        assert_eq!(
            custom.sql,
            "SELECT * FROM analytics.fact_sales WHERE payment_method = 'Cash'"
        );
    }

    #[test]
    fn test_unknown_ref_in_assertion_fails() {
        let project = builtin_project();
        let assertion = SingularTest::new("assert_bad", "SELECT * FROM {{ ref('nope') }}").unwrap();
        let err = TestPlan::build(&project, &[assertion], &HashMap::new()).unwrap_err();
        assert!(matches!(err, TestGenError::Render { ref name, .. } if name == "assert_bad"));
    }
}
