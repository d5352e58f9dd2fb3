use clap::{Parser, Subcommand};
use silo_server::{CliOverrides, Config, blob_backend, ordered_relations, run_extract};

#[derive(Parser, Debug)]
#[command(name = "silo", about = "Warehouse-to-lake extraction orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the dependency order relations would be extracted in, then exit.
    Order {
        #[command(flatten)]
        overrides: CliOverrides,
    },
    /// Run the full extraction pipeline.
    Extract {
        #[command(flatten)]
        overrides: CliOverrides,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Order { overrides } => {
            let config = Config::load(overrides)?;
            let blob = blob_backend(&config).await;
            let ordered = ordered_relations(&config, &blob).await?;
            for relation in &ordered {
                println!("{}", relation.identifier());
            }
            Ok(())
        }
        Command::Extract { overrides } => {
            let config = Config::load(overrides)?;
            run_extract(&config, |_| true).await
        }
    }
}
