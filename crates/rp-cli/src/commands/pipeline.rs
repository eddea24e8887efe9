//! Pipeline command implementation
//!
//! Runs generate, load, run and test in order against one warehouse
//! connection. Each phase needs the previous one, so the first failing phase
//! ends the pipeline.

use anyhow::Result;

use crate::cli::{GenerateArgs, GlobalArgs, LoadArgs, PipelineArgs};
use crate::commands::common::{ExitCode, EXIT_DATABASE, EXIT_TEST_FAILURE};
use crate::commands::{generate, load, run, test};
use crate::context::RuntimeContext;

/// Execute the pipeline command: generate -> load -> run -> test
pub async fn execute(args: &PipelineArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let phases = if args.skip_tests { 3 } else { 4 };

    println!("=== Phase 1/{}: Generate ===\n", phases);
    if args.skip_generate {
        println!("Skipped, using files in {}", ctx.data_dir().display());
    } else {
        let generate_args = GenerateArgs {
            seed: args.seed,
            days: args.days,
            end_date: args.end_date,
            ..GenerateArgs::default()
        };
        let summary = generate::generate(&ctx, &generate_args)?;
        generate::print_summary(&summary);
    }

    println!("\n=== Phase 2/{}: Load ===\n", phases);
    let store = ctx.raw_store()?;
    let db = ctx.open_database()?;
    load::load(&ctx, &LoadArgs::default(), &store, &db, false).await?;

    println!("\n=== Phase 3/{}: Run ===\n", phases);
    let project = ctx.compile_project()?;
    let results = run::run_models(&ctx, &project, &db, None, false).await?;
    if !results.is_success() {
        println!("\nPipeline stopped: model run failed.");
        return Err(ExitCode(EXIT_DATABASE).into());
    }

    if args.skip_tests {
        println!("\nPipeline completed successfully.");
        return Ok(());
    }

    println!("\n=== Phase 4/{}: Test ===\n", phases);
    let report = test::run_tests(&ctx, &project, &db, None, false).await?;
    if !report.summary.all_passed() {
        println!("\nPipeline completed with test failures.");
        return Err(ExitCode(EXIT_TEST_FAILURE).into());
    }

    println!("\nPipeline completed successfully.");
    Ok(())
}
