//! Dashboard command implementation

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rp_dashboard::{
    render_json, render_text, Dashboard, DashboardResult, DashboardSnapshot, DateRange, Filters,
    QueryCache,
};
use rp_db::Database;
use std::time::Duration;

use crate::cli::{DashboardArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{database_failure, print_json};
use crate::context::RuntimeContext;

/// Clears the terminal and moves the cursor home between refreshes
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Execute the dashboard command
pub async fn execute(args: &DashboardArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let db = ctx.open_database()?;
    let dashboard = Dashboard::new(&db, &ctx.config.schemas, QueryCache::default());

    let exists = db
        .relation_exists(dashboard.fact_relation())
        .await
        .map_err(|e| database_failure("Failed to inspect the warehouse", e))?;
    if !exists {
        anyhow::bail!(
            "{} does not exist; run `rp run` (or `rp pipeline`) first",
            dashboard.fact_relation()
        );
    }

    if args.list_filters {
        let options = dashboard.filter_options().await;
        match args.output {
            OutputFormat::Json => print_json(&options)?,
            OutputFormat::Text => {
                println!("Store types: {}", options.store_types.join(", "));
                println!("Categories: {}", options.categories.join(", "));
                println!("Customer segments: {}", options.customer_segments.join(", "));
            }
        }
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let filters = resolve_filters(&dashboard, args, today).await?;
    let output = args.output;

    match args.refresh {
        Some(seconds) => {
            let every = Duration::from_secs(seconds.max(1));
            dashboard
                .watch(&filters, every, |snapshot| {
                    if output == OutputFormat::Text {
                        print!("{}", CLEAR_SCREEN);
                    }
                    print_snapshot(snapshot, output)
                })
                .await
                .context("Dashboard refresh failed")?;
        }
        None => {
            let snapshot = dashboard.snapshot(&filters).await;
            print_snapshot(&snapshot, output).context("Failed to render dashboard")?;
        }
    }
    Ok(())
}

/// Filters from the command line, defaulting the period to the window
/// ending at the latest sale
async fn resolve_filters(
    dashboard: &Dashboard<'_>,
    args: &DashboardArgs,
    today: NaiveDate,
) -> Result<Filters> {
    let mut filters = match (args.start, args.end) {
        (None, None) => dashboard.default_filters(today).await,
        (start, end) => {
            let end = match end {
                Some(end) => end,
                None => dashboard.latest_sale_date().await.unwrap_or(today),
            };
            let start = start.unwrap_or(DateRange::ending_at(end).start);
            Filters::new(DateRange::new(start, end).context("Invalid date range")?)
        }
    };
    filters.store_types = args.store_type.clone();
    filters.categories = args.category.clone();
    filters.customer_segments = args.segment.clone();
    Ok(filters)
}

fn print_snapshot(snapshot: &DashboardSnapshot, output: OutputFormat) -> DashboardResult<()> {
    match output {
        OutputFormat::Text => print!("{}", render_text(snapshot)),
        OutputFormat::Json => println!("{}", render_json(snapshot)?),
    }
    Ok(())
}
