//! Generate command implementation

use anyhow::{Context, Result};
use rp_core::config::GeneratorConfig;
use rp_generate::{GenerationSummary, RetailGenerator};
use std::path::PathBuf;

use crate::cli::{GenerateArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{print_json, print_table};
use crate::context::RuntimeContext;

/// Execute the generate command
pub async fn execute(args: &GenerateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let summary = generate(&ctx, args)?;

    match args.output {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Text => print_summary(&summary),
    }
    Ok(())
}

/// Generator settings from config with command-line overrides applied
fn generator_config(base: &GeneratorConfig, args: &GenerateArgs) -> GeneratorConfig {
    let mut config = base.clone();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(stores) = args.stores {
        config.stores = stores;
    }
    if let Some(products) = args.products {
        config.products = products;
    }
    if let Some(customers) = args.customers {
        config.customers = customers;
    }
    if let Some(days) = args.days {
        config.days = days;
    }
    if args.end_date.is_some() {
        config.end_date = args.end_date;
    }
    if let Some(rate) = args.dirty_rate {
        config.dirty_rate = rate;
    }
    config
}

/// Write every generated file, returning the summary
pub(crate) fn generate(ctx: &RuntimeContext, args: &GenerateArgs) -> Result<GenerationSummary> {
    let output_dir = args
        .output_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| ctx.data_dir());
    let config = generator_config(&ctx.config.generator, args);
    let today = chrono::Local::now().date_naive();

    let mut generator =
        RetailGenerator::new(config, today).context("Invalid generator settings")?;
    log::info!(
        "Generating data from {} into {}",
        generator.start_date(),
        output_dir.display()
    );
    generator
        .generate_all(&output_dir)
        .with_context(|| format!("Failed to generate data into {}", output_dir.display()))
}

pub(crate) fn print_summary(summary: &GenerationSummary) {
    println!("✓ Generated retail data");
    let period = match (summary.start_date, summary.end_date) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        _ => "-".to_string(),
    };
    let rows = vec![
        vec!["Stores".to_string(), summary.stores.to_string()],
        vec!["Products".to_string(), summary.products.to_string()],
        vec!["Customers".to_string(), summary.customers.to_string()],
        vec!["Transactions".to_string(), summary.transactions.to_string()],
        vec!["Line items".to_string(), summary.line_items.to_string()],
        vec!["Defective rows".to_string(), summary.dirty_rows.to_string()],
        vec![
            "Total revenue".to_string(),
            format!("{:.2}", summary.total_revenue),
        ],
        vec!["Period".to_string(), period],
        vec!["Files".to_string(), summary.files.len().to_string()],
    ];
    println!();
    print_table(&["ENTITY", "VALUE"], &rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_overrides_replace_config_values() {
        let base = GeneratorConfig::default();
        let args = GenerateArgs {
            seed: Some(7),
            days: Some(3),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..GenerateArgs::default()
        };
        let config = generator_config(&base, &args);
        assert_eq!(config.seed, 7);
        assert_eq!(config.days, 3);
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(config.stores, base.stores);
        assert_eq!(config.dirty_rate, base.dirty_rate);
    }
}
