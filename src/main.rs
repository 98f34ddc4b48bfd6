use anyhow::Result;
use clap::{Parser, Subcommand};
use tspfed::core::log::init_logging;
use tspfed::providers::MonthYear;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch latest prices and rates, and snapshot a new trade date (default)
    Update {
        /// Read only this month's share price page (1-12)
        #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year of the pinned month
        #[arg(long, requires = "month")]
        year: Option<i32>,
    },
    /// Display the latest payload
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = match cli.command.unwrap_or(Commands::Update {
        month: None,
        year: None,
    }) {
        Commands::Setup => None,
        Commands::Update { month, year } => Some(tspfed::AppCommand::Update {
            period: month.zip(year).map(|(month, year)| MonthYear { month, year }),
        }),
        Commands::Show => Some(tspfed::AppCommand::Show),
    };

    let result = match command {
        Some(command) => tspfed::run_command(command, cli.config_path.as_deref()).await,
        None => match cli.config_path.as_deref() {
            Some(path) => tspfed::cli::setup::setup_at_path(path),
            None => tspfed::cli::setup::setup(),
        },
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
