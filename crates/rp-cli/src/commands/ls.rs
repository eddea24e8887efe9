//! List command implementation

use anyhow::{Context, Result};
use rp_core::{Layer, Materialization};
use rp_transform::CompiledProject;
use serde::Serialize;
use std::collections::HashSet;

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::commands::common::{print_json, print_table};
use crate::context::RuntimeContext;

/// Model information for display
#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    layer: Layer,
    materialized: Materialization,
    relation: String,
    model_deps: Vec<String>,
    source_deps: Vec<String>,
}

/// Execute the ls command
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let project = ctx.compile_project()?;

    let order = project
        .execution_order(args.select.as_deref())
        .context("Invalid selector")?;
    let models = model_info(&project, &order);

    match args.output {
        LsOutput::Table => print_models(&models),
        LsOutput::Json => print_json(&models)?,
        LsOutput::Tree => print_tree(&models),
    }
    Ok(())
}

/// Info for the named models, in the given order
fn model_info(project: &CompiledProject, names: &[String]) -> Vec<ModelInfo> {
    names
        .iter()
        .filter_map(|name| project.get(name))
        .map(|compiled| ModelInfo {
            name: compiled.model.name.to_string(),
            layer: compiled.model.layer(),
            materialized: compiled.materialization(),
            relation: compiled.relation.clone(),
            model_deps: compiled
                .model
                .depends_on
                .iter()
                .map(|d| d.to_string())
                .collect(),
            source_deps: compiled.model.sources.iter().cloned().collect(),
        })
        .collect()
}

fn print_models(models: &[ModelInfo]) {
    let rows: Vec<Vec<String>> = models
        .iter()
        .map(|m| {
            let mut deps = m.model_deps.clone();
            deps.extend(m.source_deps.iter().map(|s| format!("{} (source)", s)));
            let deps = if deps.is_empty() {
                "-".to_string()
            } else {
                deps.join(", ")
            };
            vec![
                m.name.clone(),
                m.layer.to_string(),
                m.materialized.to_string(),
                m.relation.clone(),
                deps,
            ]
        })
        .collect();

    print_table(
        &["NAME", "LAYER", "MATERIALIZED", "RELATION", "DEPENDS_ON"],
        &rows,
    );
    println!();
    println!("{} models found", models.len());
}

/// Print models in tree format, rooted at models with no listed upstream
fn print_tree(models: &[ModelInfo]) {
    let names: HashSet<&str> = models.iter().map(|m| m.name.as_str()).collect();
    let roots: Vec<&ModelInfo> = models
        .iter()
        .filter(|m| m.model_deps.iter().all(|d| !names.contains(d.as_str())))
        .collect();

    println!("Dependency Tree:");
    println!();
    for (i, root) in roots.iter().enumerate() {
        print_tree_node(&root.name, models, &names, "", i + 1 == roots.len());
    }
}

fn print_tree_node(
    name: &str,
    models: &[ModelInfo],
    names: &HashSet<&str>,
    prefix: &str,
    is_last: bool,
) {
    let connector = if prefix.is_empty() {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    println!("{}{}{}", prefix, connector, name);

    let children: Vec<&ModelInfo> = models
        .iter()
        .filter(|m| m.model_deps.iter().any(|d| d == name) && names.contains(m.name.as_str()))
        .collect();

    let child_prefix = if prefix.is_empty() {
        "  ".to_string()
    } else if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };
    for (i, child) in children.iter().enumerate() {
        print_tree_node(&child.name, models, names, &child_prefix, i + 1 == children.len());
    }
}
