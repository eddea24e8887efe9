use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["rp", "run", "-p", "/tmp/shop", "--target", "prod", "-v"]).unwrap();
    assert_eq!(cli.global.project_dir, "/tmp/shop");
    assert_eq!(cli.global.target.as_deref(), Some("prod"));
    assert!(cli.global.verbose);
    assert!(matches!(cli.command, Commands::Run(_)));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["rp", "-v", "-q", "ls"]).is_err());
}

#[test]
fn test_generate_parses_dates() {
    let cli = Cli::try_parse_from([
        "rp",
        "generate",
        "--end-date",
        "2024-06-30",
        "--days",
        "7",
        "--dirty-rate",
        "0.05",
    ])
    .unwrap();
    let Commands::Generate(args) = cli.command else {
        panic!("expected generate");
    };
    assert_eq!(args.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
    assert_eq!(args.days, Some(7));
    assert_eq!(args.dirty_rate, Some(0.05));

    assert!(Cli::try_parse_from(["rp", "generate", "--end-date", "30/06/2024"]).is_err());
}

#[test]
fn test_dashboard_filters_split_on_commas() {
    let cli = Cli::try_parse_from([
        "rp",
        "dashboard",
        "--store-type",
        "Express,Supermarket",
        "--segment",
        "Premium",
        "--output",
        "json",
    ])
    .unwrap();
    let Commands::Dashboard(args) = cli.command else {
        panic!("expected dashboard");
    };
    assert_eq!(args.store_type, vec!["Express", "Supermarket"]);
    assert_eq!(args.segment, vec!["Premium"]);
    assert!(args.category.is_empty());
    assert_eq!(args.output, OutputFormat::Json);
    assert_eq!(args.refresh, None);
}
