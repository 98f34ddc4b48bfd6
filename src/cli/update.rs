use super::ui;
use crate::core::config::AppConfig;
use crate::providers::MonthYear;
use crate::store::PersistOutcome;
use crate::update::Pipeline;
use anyhow::Result;
use chrono::Utc;

/// Runs the pipeline once and prints the one-line status.
pub async fn run(config: &AppConfig, period: Option<MonthYear>) -> Result<()> {
    let pipeline = Pipeline::new(config)?;

    let spinner = ui::new_spinner("Fetching TSP share prices and Fed rates...");
    let result = pipeline.run(Utc::now(), period).await;
    spinner.finish_and_clear();

    println!("{}", status_line(&result?));
    Ok(())
}

/// Status keyword styled, remainder plain.
fn status_line(outcome: &PersistOutcome) -> String {
    let text = outcome.to_string();
    let (keyword, rest) = text.split_once(' ').unwrap_or((text.as_str(), ""));
    let style_type = match outcome {
        PersistOutcome::New { .. } => ui::StyleType::New,
        PersistOutcome::Unchanged { .. } => ui::StyleType::Unchanged,
    };
    format!("{} {}", ui::style_text(keyword, style_type), rest)
}
