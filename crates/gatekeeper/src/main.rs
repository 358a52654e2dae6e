mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize logging (stderr, JSON)
    hookgate_runtime::init_logging(cli.verbose);

    match cli.command {
        Commands::Run { phase, format } => {
            let code =
                commands::run::execute(phase.into(), format, cli.config.as_deref(), cli.verbose)
                    .await;
            std::process::exit(code);
        }
        Commands::Init { path } => {
            commands::init::run_init(&path)?;
        }
        Commands::List { phase } => {
            commands::list::execute(phase.map(Into::into), cli.config.as_deref())?;
        }
    }

    Ok(())
}
