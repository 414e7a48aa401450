use std::path::PathBuf;

use clap::Parser;
use copy_to_sheets::config::DEFAULT_CONFIG_PATH;
use copy_to_sheets::{Config, CopyError, Result, sync};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    let config = Config::load(&cli.config)?;
    sync::copy_workbook(&config)?;
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| CopyError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Copy every sheet of a local workbook into a Google spreadsheet."
)]
struct Cli {
    /// JSON file naming the source workbook, destination spreadsheet and
    /// service-account credentials.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}
