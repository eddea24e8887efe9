//! Retail pipeline CLI - generate, load, transform, test and explore retail data

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::{exit_code_of, EXIT_ERROR};
use commands::{dashboard, generate, load, ls, pipeline, run, test};

/// Install the log subscriber. `RUST_LOG` takes precedence over the flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let default = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.global.verbose, cli.global.quiet);

    let result = match &cli.command {
        cli::Commands::Generate(args) => generate::execute(args, &cli.global).await,
        cli::Commands::Load(args) => load::execute(args, &cli.global).await,
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Test(args) => test::execute(args, &cli.global).await,
        cli::Commands::Ls(args) => ls::execute(args, &cli.global).await,
        cli::Commands::Dashboard(args) => dashboard::execute(args, &cli.global).await,
        cli::Commands::Pipeline(args) => pipeline::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        let code = exit_code_of(&err).unwrap_or_else(|| {
            eprintln!("Error: {:#}", err);
            EXIT_ERROR
        });
        std::process::exit(code);
    }
}
