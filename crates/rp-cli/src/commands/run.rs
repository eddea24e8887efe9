//! Run command implementation

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rp_db::Database;
use rp_transform::{
    CompiledProject, ModelRunResult, ModelRunner, RunResults, RunStatus, TransformError,
};

use crate::cli::{GlobalArgs, OutputFormat, RunArgs};
use crate::commands::common::{database_failure, print_json, write_json_results, ExitCode, EXIT_DATABASE};
use crate::context::RuntimeContext;

/// File the run results are written to under the target directory
pub(crate) const RUN_RESULTS_FILE: &str = "run_results.json";

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let project = ctx.compile_project()?;
    let db = ctx.open_database()?;

    let json_mode = args.output == OutputFormat::Json;
    let results = run_models(&ctx, &project, &db, args.select.as_deref(), json_mode).await?;

    if json_mode {
        print_json(&results)?;
    }
    if !results.is_success() {
        return Err(ExitCode(EXIT_DATABASE).into());
    }
    Ok(())
}

/// Materialize the selected models, report progress and write the results
/// file. Model failures are reported in the returned results.
pub(crate) async fn run_models(
    ctx: &RuntimeContext,
    project: &CompiledProject,
    db: &dyn Database,
    selector: Option<&str>,
    quiet: bool,
) -> Result<RunResults> {
    let order = project
        .execution_order(selector)
        .context("Invalid selector")?;
    if order.is_empty() {
        anyhow::bail!("No models match the selection");
    }

    if !quiet {
        println!("Running {} models...\n", order.len());
    }

    let progress = if quiet {
        None
    } else {
        let pb = ProgressBar::new(order.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let runner = ModelRunner::new(db, project);
    let outcome = runner
        .run(selector, |result| {
            let line = result_line(result);
            match &progress {
                Some(pb) => {
                    pb.println(line);
                    pb.set_message(result.model.clone());
                    pb.inc(1);
                }
                None => log::info!("{}", line),
            }
        })
        .await;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let results = match outcome {
        Ok(results) => results,
        Err(TransformError::Database(e)) => {
            return Err(database_failure("Failed to prepare schemas", e))
        }
        Err(e) => return Err(e).context("Run failed"),
    };

    write_json_results(&ctx.artifact_path(RUN_RESULTS_FILE), &results)?;

    if !quiet {
        println!();
        println!(
            "Completed in {:.2}s: {} succeeded, {} failed, {} skipped",
            results.elapsed_secs,
            results.success_count,
            results.failure_count,
            results.skipped_count
        );
    }
    Ok(results)
}

fn result_line(result: &ModelRunResult) -> String {
    match result.status {
        RunStatus::Success => format!(
            "  ✓ {} ({}) [{}ms]",
            result.model,
            result.materialization,
            (result.duration_secs * 1000.0).round()
        ),
        RunStatus::Error => format!(
            "  ✗ {} - {}",
            result.model,
            result.error.as_deref().unwrap_or("unknown error")
        ),
        RunStatus::Skipped => format!("  - {} (skipped)", result.model),
    }
}
