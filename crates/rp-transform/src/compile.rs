//! Model compilation: render templates, extract dependencies, build the DAG
//!
//! Rendering happens in two passes. The first renders every template with
//! `ref()` resolving to bare names, which is enough to capture `config()` and
//! so each model's layer. The second renders with `ref()` resolving to the
//! schema-qualified relation of the referenced model.

use crate::error::{TransformError, TransformResult};
use rp_core::{Entity, Materialization, Model, ModelDag, SchemaConfig};
use rp_jinja::{JinjaEnvironment, RelationMap};
use rp_sql::{categorize_dependencies, extract_dependencies, SqlParser};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A model with its final SQL
#[derive(Debug, Clone)]
pub struct CompiledModel {
    /// Model definition, with config and dependencies filled in
    pub model: Model,
    /// Rendered SELECT
    pub sql: String,
    /// Schema-qualified relation the model materializes
    pub relation: String,
}

impl CompiledModel {
    /// Materialization of the model
    pub fn materialization(&self) -> Materialization {
        self.model.materialization()
    }

    /// `CREATE OR REPLACE` statement materializing the model
    pub fn ddl(&self) -> String {
        format!(
            "CREATE OR REPLACE {} {} AS {}",
            self.materialization().sql_keyword(),
            self.relation,
            self.sql
        )
    }
}

/// All compiled models and their dependency graph
#[derive(Debug)]
pub struct CompiledProject {
    /// Compiled models keyed by name
    pub models: BTreeMap<String, CompiledModel>,
    /// Model dependency graph
    pub dag: ModelDag,
    /// Schema names the models compile against
    pub schemas: SchemaConfig,
}

impl CompiledProject {
    /// Look up a compiled model
    pub fn get(&self, name: &str) -> Option<&CompiledModel> {
        self.models.get(name)
    }

    /// Model name to schema-qualified relation
    pub fn relations(&self) -> HashMap<String, String> {
        self.models
            .iter()
            .map(|(name, compiled)| (name.clone(), compiled.relation.clone()))
            .collect()
    }

    /// Models to run, in dependency order.
    ///
    /// Selectors are comma-separated `model`, `+model` or `model+` terms; the
    /// union of their selections is returned.
    pub fn execution_order(&self, selector: Option<&str>) -> TransformResult<Vec<String>> {
        let order = self.dag.topological_order()?;
        let Some(selector) = selector else {
            return Ok(order);
        };

        let mut selected = HashSet::new();
        for term in selector.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            selected.extend(self.dag.select(term)?);
        }
        Ok(order.into_iter().filter(|m| selected.contains(m)).collect())
    }

    /// Schemas the models materialize into, deduplicated in layer order
    pub fn target_schemas(&self) -> Vec<String> {
        let used: HashSet<&str> = self
            .models
            .values()
            .map(|m| m.model.target_schema(&self.schemas))
            .collect();
        self.schemas
            .all()
            .into_iter()
            .filter(|s| used.contains(s))
            .map(String::from)
            .collect()
    }
}

/// Names of the raw tables `source('raw', ...)` accepts
pub fn raw_tables() -> HashSet<String> {
    Entity::ALL
        .iter()
        .map(|e| e.table_name().to_string())
        .collect()
}

/// Compile models against the configured schemas and template variables
pub fn compile(
    models: Vec<Model>,
    schemas: &SchemaConfig,
    vars: &HashMap<String, serde_yaml::Value>,
) -> TransformResult<CompiledProject> {
    let tables = raw_tables();

    let discovery = JinjaEnvironment::new(vars, RelationMap::discovery(&schemas.raw, tables.clone()));
    let mut models = models;
    for model in models.iter_mut() {
        let (_, config) = discovery
            .render_with_config(&model.raw_sql)
            .map_err(|source| TransformError::Render {
                model: model.name.to_string(),
                source,
            })?;
        model.config = config;
    }

    let relations: HashMap<String, String> = models
        .iter()
        .map(|m| (m.name.to_string(), m.qualified_name(schemas)))
        .collect();
    let known_models: HashSet<String> = relations.keys().cloned().collect();
    let known_sources: HashSet<String> = tables
        .iter()
        .map(|t| format!("{}.{}", schemas.raw, t).to_lowercase())
        .collect();

    let env = JinjaEnvironment::new(
        vars,
        RelationMap::resolved(&schemas.raw, tables, relations.clone()),
    );
    let parser = SqlParser::duckdb();

    let mut compiled = BTreeMap::new();
    let mut dependencies: HashMap<String, Vec<String>> = HashMap::new();

    for mut model in models {
        let name = model.name.to_string();
        let sql = env
            .render(&model.raw_sql)
            .map_err(|source| TransformError::Render {
                model: name.clone(),
                source,
            })?;
        let sql = sql.trim().to_string();

        let statement = parser
            .parse_model_query(&sql)
            .map_err(|source| TransformError::Parse {
                model: name.clone(),
                source,
            })?;
        let deps = categorize_dependencies(
            extract_dependencies(std::slice::from_ref(&statement)),
            &known_models,
            &known_sources,
        );
        for unknown in &deps.unknown {
            log::warn!("{} references unknown relation '{}'", name, unknown);
        }

        model.depends_on = deps.models.iter().map(|d| d.as_str().into()).collect();
        model.sources = deps.sources;
        model.compiled_sql = Some(sql.clone());
        dependencies.insert(name.clone(), deps.models.into_iter().collect());

        log::debug!(
            "Compiled {} ({}, depends on {:?})",
            name,
            model.materialization(),
            model.depends_on
        );

        let relation = relations.get(&name).cloned().unwrap_or_else(|| name.clone());
        compiled.insert(name, CompiledModel { model, sql, relation });
    }

    let dag = ModelDag::build(&dependencies)?;

    Ok(CompiledProject {
        models: compiled,
        dag,
        schemas: schemas.clone(),
    })
}

#[cfg(test)]
#[path = "compile_test.rs"]
mod tests;
