//! Anchorcam CLI - drive the anchoring render loop headlessly

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod sim;

#[derive(Parser)]
#[command(name = "anchorcam")]
#[command(about = "Surface anchoring render loop driver", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, env = "ANCHORCAM_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the render loop against a simulated session
    Run {
        /// Override the number of ticks
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Run without sleeping between ticks
        #[arg(long)]
        fast: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut config = config::load_config(cli.config)?;

    match cli.command {
        Commands::Run { ticks, fast, json } => {
            if let Some(ticks) = ticks {
                config.simulation.ticks = ticks;
            }
            if fast {
                config.simulation.tick_interval_ms = 0;
            }
            commands::run::run(&config, json)
        }
        Commands::Config => commands::config::show(&config),
    }
}
