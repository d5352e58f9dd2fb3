use clap::Parser;
use silo_cli::{Cli, Command};

#[test]
fn extract_dry_run_flag_parses() {
    let cli = Cli::parse_from(["silo", "extract", "--config-file", "silo.yaml", "--dry-run"]);
    match cli.command {
        Command::Extract { overrides } => {
            assert!(overrides.dry_run);
            assert_eq!(overrides.config_file.to_string_lossy(), "silo.yaml");
        }
        _ => panic!("expected extract subcommand"),
    }
}

#[test]
fn order_subcommand_requires_config_file() {
    let result = Cli::try_parse_from(["silo", "order"]);
    assert!(result.is_err());
}
