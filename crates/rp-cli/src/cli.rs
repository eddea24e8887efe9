//! CLI argument definitions using clap derive API

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Retail pipeline - synthetic retail data from generation to dashboard
#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named target from pipeline.yml (falls back to RP_TARGET)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate synthetic stores, products, customers and transactions as CSV
    Generate(GenerateArgs),

    /// Upload generated files to object storage and bulk-load the raw tables
    Load(LoadArgs),

    /// Materialize the staging and mart models
    Run(RunArgs),

    /// Run data tests against the materialized models
    Test(TestArgs),

    /// List models and their dependencies
    Ls(LsArgs),

    /// Show the sales dashboard
    Dashboard(DashboardArgs),

    /// Generate, load, run and test in one go
    Pipeline(PipelineArgs),
}

/// Output formats shared by several commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

/// Arguments for the generate command
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Output directory (default: data_dir from config)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of stores
    #[arg(long)]
    pub stores: Option<usize>,

    /// Number of products
    #[arg(long)]
    pub products: Option<usize>,

    /// Number of customers
    #[arg(long)]
    pub customers: Option<usize>,

    /// Days of transactions
    #[arg(long)]
    pub days: Option<u32>,

    /// Last transaction date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Fraction of rows written with defects (0.0 - 1.0)
    #[arg(long)]
    pub dirty_rate: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the load command
#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Directory of generated files (default: data_dir from config)
    #[arg(short, long)]
    pub data_dir: Option<String>,

    /// Partition date for dimension files, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub load_date: Option<NaiveDate>,

    /// Reload the raw tables from what is already in storage
    #[arg(long)]
    pub skip_upload: bool,

    /// List the stored objects after uploading
    #[arg(long)]
    pub list: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Model selector: comma-separated `model`, `+model` or `model+`
    #[arg(short, long)]
    pub select: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the test command
#[derive(Args, Debug, Clone, Default)]
pub struct TestArgs {
    /// Only run schema tests of the selected models
    #[arg(short, long)]
    pub select: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the ls command
#[derive(Args, Debug, Clone)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,

    /// Model selector
    #[arg(short, long)]
    pub select: Option<String>,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
    /// Dependency tree
    Tree,
}

/// Arguments for the dashboard command
#[derive(Args, Debug, Clone, Default)]
pub struct DashboardArgs {
    /// First day of the period, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the period, YYYY-MM-DD (default: latest sale)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Store types to include (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub store_type: Vec<String>,

    /// Product categories to include (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,

    /// Customer segments to include (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub segment: Vec<String>,

    /// Print the values available for each filter and exit
    #[arg(long)]
    pub list_filters: bool,

    /// Re-render every N seconds until Ctrl-C
    #[arg(long, value_name = "SECONDS")]
    pub refresh: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the pipeline command
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Reuse the files already in the data directory
    #[arg(long)]
    pub skip_generate: bool,

    /// Stop after materializing the models
    #[arg(long)]
    pub skip_tests: bool,

    /// RNG seed for the generate phase
    #[arg(long)]
    pub seed: Option<u64>,

    /// Days of transactions for the generate phase
    #[arg(long)]
    pub days: Option<u32>,

    /// Last transaction date for the generate phase, YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
