//! Error taxonomy for the fetch, parse and rate lookup stages.
//!
//! File system failures are not modelled here; they surface as `anyhow`
//! errors with context from the store.

use thiserror::Error;

/// A single HTTP fetch failed. No retry happens at this level.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Outcome of one month's TSP page attempt.
#[derive(Debug, Error)]
pub enum TspPageError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("could not locate a dated share price table")]
    MissingTable,

    #[error("could not parse trade date heading '{heading}': {source}")]
    InvalidHeading {
        heading: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Every candidate month failed; carries the last one tried.
#[derive(Debug, Error)]
#[error("failed to fetch TSP latest prices for {month:02}/{year}: {source}")]
pub struct TspParseError {
    pub month: u32,
    pub year: i32,
    #[source]
    pub source: TspPageError,
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("malformed CSV for series {series}: {source}")]
    Csv {
        series: String,
        #[source]
        source: csv::Error,
    },

    #[error("series {series} has no observation date column")]
    MissingDateColumn { series: String },
}
