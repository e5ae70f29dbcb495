mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use marktest::Runner;

fn main() -> Result<()> {
    marktest::logger::init_logger();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { color, config } => {
            let config = cli::load_config(config.as_ref(), color)?;
            let runner = Runner::new(&config)?;
            let failed = cli::run_demo(&runner);
            tracing::info!(failed, "Demo finished");
        }
    }
    Ok(())
}
