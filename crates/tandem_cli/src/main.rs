//! Tandem CLI
//!
//! Runs recording/playback scenarios against headless surfaces and prints
//! the effective configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tandem_cli::{run_scenario, Scenario, TandemConfig};
use tracing_subscriber::EnvFilter;

/// Headless action recording and synchronized playback
#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(about = "Record actions in one surface and replay them in others")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./tandem.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a JSON scenario
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(config: &TandemConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("tandem=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TandemConfig::resolve(cli.config.as_deref(), Path::new("."))?;
    init_tracing(&config);

    match cli.command {
        Commands::Run { scenario, report } => cmd_run(&config, &scenario, report.as_deref()),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn cmd_run(config: &TandemConfig, path: &Path, report_path: Option<&Path>) -> Result<()> {
    let scenario = Scenario::from_path(path)?;
    let report = run_scenario(&scenario, config);

    match report_path {
        Some(out) => {
            report.write_to_path(out)?;
            tracing::info!(path = %out.display(), "report written");
        }
        None => report.write_to_writer(&mut std::io::stdout().lock())?,
    }

    if !report.is_passed() {
        std::process::exit(1);
    }
    Ok(())
}
