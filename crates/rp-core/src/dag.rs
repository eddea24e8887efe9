//! DAG building and topological sorting

use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A directed acyclic graph of model dependencies
#[derive(Debug)]
pub struct ModelDag {
    /// The underlying graph; edges point from a dependency to its dependent
    graph: DiGraph<ModelName, ()>,

    /// Map from model name to node index
    node_map: HashMap<ModelName, NodeIndex>,
}

impl ModelDag {
    /// Create a new empty DAG
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a model to the DAG
    pub fn add_model(&mut self, name: &str) -> CoreResult<NodeIndex> {
        if let Some(&idx) = self.node_map.get(name) {
            Ok(idx)
        } else {
            let model_name = ModelName::try_new(name).ok_or_else(|| CoreError::EmptyName {
                context: "model name in DAG".into(),
            })?;
            let idx = self.graph.add_node(model_name.clone());
            self.node_map.insert(model_name, idx);
            Ok(idx)
        }
    }

    /// Add a dependency edge (`from` depends on `to`)
    pub fn add_dependency(&mut self, from: &str, to: &str) -> CoreResult<()> {
        let from_idx = self.add_model(from)?;
        let to_idx = self.add_model(to)?;
        // Edge goes from dependency to dependent so sorting yields dependencies first
        self.graph.add_edge(to_idx, from_idx, ());
        Ok(())
    }

    /// Build the DAG from a map of model name -> dependencies
    ///
    /// Dependencies that are not themselves models (sources) are ignored.
    pub fn build(dependencies: &HashMap<String, Vec<String>>) -> CoreResult<Self> {
        let mut dag = Self::new();

        let mut models: Vec<&String> = dependencies.keys().collect();
        models.sort();

        for model in &models {
            dag.add_model(model)?;
        }

        for model in models {
            for dep in &dependencies[model] {
                if dependencies.contains_key(dep) {
                    dag.add_dependency(model, dep)?;
                }
            }
        }

        dag.validate()?;

        Ok(dag)
    }

    /// Validate the DAG has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => {
                let cycle_str = self.find_cycle_path(cycle.node_id());
                Err(CoreError::CircularDependency { cycle: cycle_str })
            }
        }
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    /// Get models in topological order (dependencies first).
    ///
    /// Ties are broken by name, so the order is stable across runs.
    pub fn topological_order(&self) -> CoreResult<Vec<String>> {
        self.validate()?;

        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                (
                    idx,
                    self.graph.edges_directed(idx, Direction::Incoming).count(),
                )
            })
            .collect();

        let mut ready: BTreeSet<(ModelName, NodeIndex)> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&idx, _)| (self.graph[idx].clone(), idx))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(next) = ready.iter().next().cloned() {
            ready.remove(&next);
            let (name, idx) = next;
            order.push(name.to_string());

            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let target = edge.target();
                if let Some(deg) = in_degree.get_mut(&target) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert((self.graph[target].clone(), target));
                    }
                }
            }
        }

        Ok(order)
    }

    /// Get direct dependencies of a model
    pub fn dependencies(&self, model: &str) -> Vec<String> {
        self.neighbors(model, Direction::Incoming)
    }

    /// Get direct dependents of a model
    pub fn dependents(&self, model: &str) -> Vec<String> {
        self.neighbors(model, Direction::Outgoing)
    }

    fn neighbors(&self, model: &str, direction: Direction) -> Vec<String> {
        let Some(&idx) = self.node_map.get(model) else {
            return Vec::new();
        };
        let mut names: Vec<String> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| match direction {
                Direction::Incoming => self.graph[e.source()].to_string(),
                Direction::Outgoing => self.graph[e.target()].to_string(),
            })
            .collect();
        names.sort();
        names
    }

    /// Get all ancestors (transitive dependencies) of a model
    pub fn ancestors(&self, model: &str) -> Vec<String> {
        self.collect_reachable(model, Direction::Incoming)
    }

    /// Get all descendants (transitive dependents) of a model
    pub fn descendants(&self, model: &str) -> Vec<String> {
        self.collect_reachable(model, Direction::Outgoing)
    }

    /// Collect all nodes reachable from `model` by following edges in `direction` (DFS).
    fn collect_reachable(&self, model: &str, direction: Direction) -> Vec<String> {
        let Some(&start) = self.node_map.get(model) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, direction) {
                let neighbor = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                if visited.insert(neighbor) {
                    result.push(self.graph[neighbor].to_string());
                    stack.push(neighbor);
                }
            }
        }

        result
    }

    /// Get models matching a selector pattern, in topological order.
    ///
    /// Supports: `model`, `+model` (ancestors + model), `model+` (model + descendants)
    pub fn select(&self, selector: &str) -> CoreResult<Vec<String>> {
        let (prefix, model_name, suffix) = Self::parse_selector(selector);

        if model_name.is_empty() {
            return Err(CoreError::EmptyName {
                context: format!("selector '{}'", selector),
            });
        }
        if !self.node_map.contains_key(model_name) {
            return Err(CoreError::ModelNotFound {
                name: model_name.to_string(),
            });
        }

        let mut selected = vec![model_name.to_string()];

        if prefix {
            selected.extend(self.ancestors(model_name));
        }

        if suffix {
            selected.extend(self.descendants(model_name));
        }

        let order = self.topological_order()?;
        let selected_set: HashSet<_> = selected.into_iter().collect();
        Ok(order
            .into_iter()
            .filter(|m| selected_set.contains(m))
            .collect())
    }

    /// Parse a selector string into (has_prefix, model_name, has_suffix)
    fn parse_selector(selector: &str) -> (bool, &str, bool) {
        let prefix = selector.starts_with('+');
        let suffix = selector.ends_with('+');

        let model_name = selector.trim_start_matches('+').trim_end_matches('+');

        (prefix, model_name, suffix)
    }

    /// Get all model names in the DAG
    pub fn models(&self) -> Vec<ModelName> {
        let mut names: Vec<ModelName> = self.node_map.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a model exists in the DAG
    pub fn contains(&self, model: &str) -> bool {
        self.node_map.contains_key(model)
    }
}

impl Default for ModelDag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
