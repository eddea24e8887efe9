//! Relation dependency extraction from SQL AST

use sqlparser::ast::{ObjectName, Query, Statement, Visit, Visitor};
use std::collections::{BTreeSet, HashSet};
use std::ops::ControlFlow;

/// Walks a statement collecting relation names and CTE aliases
#[derive(Default)]
struct RelationCollector {
    relations: HashSet<String>,
    ctes: HashSet<String>,
}

impl Visitor for RelationCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.ctes.insert(cte.alias.name.value.to_lowercase());
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        let name = relation
            .0
            .iter()
            .filter_map(|part| part.as_ident().map(|ident| ident.value.to_lowercase()))
            .collect::<Vec<_>>()
            .join(".");
        if !name.is_empty() {
            self.relations.insert(name);
        }
        ControlFlow::Continue(())
    }
}

/// Extract all relation references from SQL statements
///
/// Names are lower-cased; references to CTEs defined in the same statement
/// are dropped.
pub fn extract_dependencies(statements: &[Statement]) -> HashSet<String> {
    let mut collector = RelationCollector::default();
    for stmt in statements {
        let _ = stmt.visit(&mut collector);
    }

    let RelationCollector { relations, ctes } = collector;
    relations
        .into_iter()
        .filter(|name| name.contains('.') || !ctes.contains(name))
        .collect()
}

/// Model and source dependencies of one model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Other models this model reads from
    pub models: BTreeSet<String>,
    /// Raw source tables this model reads from
    pub sources: BTreeSet<String>,
    /// References that are neither a known model nor a known source
    pub unknown: BTreeSet<String>,
}

/// Categorize dependencies into models, sources and unknown relations
///
/// A reference matches a model by its last name component (`staging.stg_stores`
/// matches `stg_stores`); sources match on the full qualified name.
pub fn categorize_dependencies(
    deps: HashSet<String>,
    known_models: &HashSet<String>,
    known_sources: &HashSet<String>,
) -> Dependencies {
    let mut out = Dependencies::default();

    for dep in deps {
        let short = normalize_table_name(&dep);
        if known_sources.contains(&dep) {
            out.sources.insert(dep);
        } else if known_models.contains(&short) {
            out.models.insert(short);
        } else {
            out.unknown.insert(dep);
        }
    }

    out
}

/// Take only the last component of a qualified name
fn normalize_table_name(name: &str) -> String {
    name.split('.').next_back().unwrap_or(name).to_string()
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
