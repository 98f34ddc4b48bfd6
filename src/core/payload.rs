//! Payload model and its JSON schema

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

pub const SCHEMA_VERSION: &str = "v1";
pub const TSP_NOTE: &str = "Unofficial mirror used because tsp.gov may block direct server access.";

/// TSP fund codes, in the order they are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum FundCode {
    C,
    S,
    I,
    G,
    F,
}

impl FundCode {
    pub const ALL: [FundCode; 5] = [
        FundCode::C,
        FundCode::S,
        FundCode::I,
        FundCode::G,
        FundCode::F,
    ];

    /// Label used for the fund on the share price page.
    pub fn label(&self) -> &'static str {
        match self {
            FundCode::C => "C Fund",
            FundCode::S => "S Fund",
            FundCode::I => "I Fund",
            FundCode::G => "G Fund",
            FundCode::F => "F Fund",
        }
    }
}

impl Display for FundCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FundCode::C => "C",
                FundCode::S => "S",
                FundCode::I => "I",
                FundCode::G => "G",
                FundCode::F => "F",
            }
        )
    }
}

/// Share price per fund. Every code is always present; a fund missing from
/// the source page maps to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundPriceSet(BTreeMap<FundCode, Option<f64>>);

impl FundPriceSet {
    pub fn from_fn(mut price_of: impl FnMut(FundCode) -> Option<f64>) -> Self {
        Self(
            FundCode::ALL
                .into_iter()
                .map(|code| (code, price_of(code)))
                .collect(),
        )
    }

    pub fn get(&self, code: FundCode) -> Option<f64> {
        self.0.get(&code).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FundCode, Option<f64>)> + '_ {
        FundCode::ALL.into_iter().map(|code| (code, self.get(code)))
    }

    pub fn found(&self) -> usize {
        self.iter().filter(|(_, price)| price.is_some()).count()
    }
}

impl Default for FundPriceSet {
    fn default() -> Self {
        Self::from_fn(|_| None)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub effective_fed_funds_rate: Option<f64>,
    pub target_lower: Option<f64>,
    pub target_upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FedSection {
    #[serde(flatten)]
    pub rates: RateSnapshot,
    pub source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TspSection {
    pub funds: FundPriceSet,
    pub source: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub producer: String,
}

/// Result of one run, written to `latest.json` and, on a new trade date,
/// to `snapshots/<trade_date>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub as_of_utc: DateTime<Utc>,
    pub trade_date: NaiveDate,
    pub fed: FedSection,
    pub tsp: TspSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Payload {
    /// Pretty JSON with a trailing newline, as written to disk.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
