//! Materialize compiled models in dependency order

use crate::compile::{CompiledModel, CompiledProject};
use crate::error::TransformResult;
use chrono::{DateTime, Utc};
use rp_core::Materialization;
use rp_db::Database;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Outcome of materializing one model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
    Skipped,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Error => write!(f, "error"),
            RunStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Run result for a single model
#[derive(Debug, Clone, Serialize)]
pub struct ModelRunResult {
    pub model: String,
    pub status: RunStatus,
    pub materialization: String,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunResults {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    pub results: Vec<ModelRunResult>,
}

impl RunResults {
    /// Whether every selected model materialized
    pub fn is_success(&self) -> bool {
        self.failure_count == 0 && self.skipped_count == 0
    }

    /// Result for a model, if it was selected
    pub fn result(&self, model: &str) -> Option<&ModelRunResult> {
        self.results.iter().find(|r| r.model == model)
    }
}

/// Runs compiled models against a warehouse
pub struct ModelRunner<'a> {
    db: &'a dyn Database,
    project: &'a CompiledProject,
}

impl<'a> ModelRunner<'a> {
    pub fn new(db: &'a dyn Database, project: &'a CompiledProject) -> Self {
        Self { db, project }
    }

    /// Materialize the selected models (all when `selector` is `None`).
    ///
    /// The first failing model stops the run; models after it are reported
    /// as skipped. `on_result` is called as each model finishes.
    pub async fn run<F>(&self, selector: Option<&str>, mut on_result: F) -> TransformResult<RunResults>
    where
        F: FnMut(&ModelRunResult),
    {
        let order = self.project.execution_order(selector)?;
        let started_at = Utc::now();
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        for schema in self.project.target_schemas() {
            self.db.create_schema_if_not_exists(&schema).await?;
        }

        log::info!("Run {}: {} models", run_id, order.len());

        let mut results = Vec::with_capacity(order.len());
        let mut success_count = 0;
        let mut failure_count = 0;
        let mut stopped_early = false;

        for name in &order {
            let Some(compiled) = self.project.get(name) else {
                log::warn!("Model '{}' missing from compiled project, skipping", name);
                continue;
            };

            let result = if stopped_early {
                ModelRunResult {
                    model: name.clone(),
                    status: RunStatus::Skipped,
                    materialization: compiled.materialization().to_string(),
                    duration_secs: 0.0,
                    error: Some("skipped: upstream failure".to_string()),
                }
            } else {
                let result = self.run_model(name, compiled).await;
                match result.status {
                    RunStatus::Success => success_count += 1,
                    _ => {
                        failure_count += 1;
                        stopped_early = true;
                    }
                }
                result
            };

            on_result(&result);
            results.push(result);
        }

        let skipped_count = results
            .iter()
            .filter(|r| r.status == RunStatus::Skipped)
            .count();

        Ok(RunResults {
            run_id,
            started_at,
            elapsed_secs: start.elapsed().as_secs_f64(),
            success_count,
            failure_count,
            skipped_count,
            results,
        })
    }

    async fn run_model(&self, name: &str, compiled: &CompiledModel) -> ModelRunResult {
        let start = Instant::now();
        let materialization = compiled.materialization();

        // A model may change kind between runs
        let outcome = match self.db.drop_if_exists(&compiled.relation).await {
            Ok(()) => match materialization {
                Materialization::View => {
                    self.db
                        .create_view_as(&compiled.relation, &compiled.sql, true)
                        .await
                }
                Materialization::Table => {
                    self.db
                        .create_table_as(&compiled.relation, &compiled.sql, true)
                        .await
                }
            },
            Err(e) => Err(e),
        };

        let duration_secs = start.elapsed().as_secs_f64();
        match outcome {
            Ok(()) => {
                log::debug!("Built {} as {} in {:.2}s", compiled.relation, materialization, duration_secs);
                ModelRunResult {
                    model: name.to_string(),
                    status: RunStatus::Success,
                    materialization: materialization.to_string(),
                    duration_secs,
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Model {} failed: {}", name, e);
                ModelRunResult {
                    model: name.to_string(),
                    status: RunStatus::Error,
                    materialization: materialization.to_string(),
                    duration_secs,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
