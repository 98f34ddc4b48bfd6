//! Fed funds rates from FRED's public CSV download.

use crate::core::{Fetcher, RateError, RateSnapshot};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const EFFECTIVE_RATE_SERIES: &str = "DFF";
pub const TARGET_LOWER_SERIES: &str = "DFEDTARL";
pub const TARGET_UPPER_SERIES: &str = "DFEDTARU";

const DATE_COLUMNS: [&str; 2] = ["observation_date", "DATE"];
/// FRED marks a day without an observation with a single dot.
const MISSING_OBSERVATION: &str = ".";

pub struct FredProvider {
    base_url: String,
    fetcher: Arc<dyn Fetcher>,
}

impl FredProvider {
    pub fn new(base_url: &str, fetcher: Arc<dyn Fetcher>) -> Self {
        FredProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    pub fn series_url(&self, series_id: &str) -> String {
        format!("{}/graph/fredgraph.csv?id={}", self.base_url, series_id)
    }

    /// Download URLs for the effective, lower and upper series, in that order.
    pub fn source_urls(&self) -> Vec<String> {
        [
            EFFECTIVE_RATE_SERIES,
            TARGET_LOWER_SERIES,
            TARGET_UPPER_SERIES,
        ]
        .iter()
        .map(|id| self.series_url(id))
        .collect()
    }

    /// Full history of one series, with unreported days left out.
    pub async fn series(&self, series_id: &str) -> Result<HashMap<NaiveDate, f64>, RateError> {
        let url = self.series_url(series_id);
        debug!("Requesting series from {}", url);
        let text = self.fetcher.fetch(&url).await?;
        parse_series(series_id, &text)
    }

    /// Values recorded on exactly `date`. A series without an entry for that
    /// date leaves its field empty.
    #[instrument(name = "FredRates", skip(self), fields(date = %date))]
    pub async fn rates_for_date(&self, date: NaiveDate) -> Result<RateSnapshot, RateError> {
        let effective = self.series(EFFECTIVE_RATE_SERIES).await?;
        let lower = self.series(TARGET_LOWER_SERIES).await?;
        let upper = self.series(TARGET_UPPER_SERIES).await?;

        let snapshot = RateSnapshot {
            effective_fed_funds_rate: effective.get(&date).copied(),
            target_lower: lower.get(&date).copied(),
            target_upper: upper.get(&date).copied(),
        };
        debug!(?snapshot, "Matched rates");
        Ok(snapshot)
    }
}

/// Parses a two-column `date,<series_id>` CSV into a date to value map.
fn parse_series(series_id: &str, text: &str) -> Result<HashMap<NaiveDate, f64>, RateError> {
    let csv_error = |source| RateError::Csv {
        series: series_id.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers().map_err(csv_error)?.clone();

    let date_idx = headers
        .iter()
        .position(|h| DATE_COLUMNS.contains(&h))
        .ok_or_else(|| RateError::MissingDateColumn {
            series: series_id.to_string(),
        })?;
    let Some(value_idx) = headers.iter().position(|h| h == series_id) else {
        warn!(series_id, "Series column missing from CSV, no values available");
        return Ok(HashMap::new());
    };

    let mut out = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let (Some(date), Some(value)) = (record.get(date_idx), record.get(value_idx)) else {
            continue;
        };
        if value.is_empty() || value == MISSING_OBSERVATION {
            continue;
        }

        let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
            warn!(series_id, date, "Skipping row with unparseable date");
            continue;
        };
        match value.parse::<f64>() {
            Ok(v) => {
                out.insert(date, v);
            }
            Err(e) => warn!(series_id, value, error = %e, "Skipping non-numeric observation"),
        }
    }

    debug!(series_id, observations = out.len(), "Parsed series");
    Ok(out)
}
