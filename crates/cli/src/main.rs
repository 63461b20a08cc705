use clap::{Parser, Subcommand};

mod commands;
mod logging;

use commands::{CheckConfigArgs, RunArgs};

#[derive(Parser)]
#[command(name = "arbitrager")]
#[command(about = "Cross-venue arbitrage on paper venues", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the arbitrage loop until Ctrl+C
    Run(RunArgs),
    /// Load and validate a config file, then print a summary
    CheckConfig(CheckConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = match &cli.command {
        Commands::Run(args) => args.log_path(),
        Commands::CheckConfig(_) => None,
    };
    logging::init(log_path.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run_arbitrager(args).await?,
        Commands::CheckConfig(args) => commands::run_check_config(&args)?,
    }

    Ok(())
}
