use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::info;

use charity_grants::{exit_codes, logging, run, RunConfig};

#[derive(Parser)]
#[command(
    name = "charity-grants",
    version,
    about = "Report Form 990 grant values per year for every charity in a roster"
)]
struct Cli {
    /// Path to charity CSV
    #[arg(short = 'c', long = "charities", env = "CHARITY_CSV")]
    charities: PathBuf,

    /// Path to a sqlite3 database with a `grants` table (ein, tax_period, value)
    #[arg(short = 'd', long = "database", env = "GRANTS_DB")]
    database: PathBuf,

    /// Treat the first CSV row as a header and locate columns by label
    #[arg(long)]
    header: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::OK,
                _ => exit_codes::FAILURE,
            };
            // print() routes help to stdout and errors to stderr; we exit either way
            err.print().ok();
            std::process::exit(code);
        }
    };

    logging::init();

    if let Err(err) = run_cli(cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILURE);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let config = RunConfig::new(cli.charities, cli.database, cli.header)?;
    let summary = run(&config, io::stdout().lock())?;
    info!(
        grants = summary.grants_in_store,
        charities = summary.charities,
        failed_lookups = summary.failed_lookups,
        "report written"
    );
    Ok(())
}
