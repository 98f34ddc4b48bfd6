pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod update;

use crate::core::config::AppConfig;
use crate::providers::MonthYear;
use anyhow::Result;
use tracing::debug;

pub enum AppCommand {
    /// Fetch, merge and persist; `period` pins the TSP page to one month.
    Update { period: Option<MonthYear> },
    Show,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = AppConfig::load_or_default(config_path)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Update { period } => cli::update::run(&config, period).await,
        AppCommand::Show => cli::show::run(&config),
    }
}
