//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod fetch;
pub mod log;
pub mod payload;

// Re-export main types for cleaner imports
pub use error::{NetworkError, RateError, TspPageError, TspParseError};
pub use fetch::Fetcher;
pub use payload::{FundCode, FundPriceSet, Payload, RateSnapshot};
