pub mod fred;
pub mod http;
pub mod tsp;

pub use fred::FredProvider;
pub use http::HttpFetcher;
pub use tsp::{MonthYear, TspProvider, TspQuote};
