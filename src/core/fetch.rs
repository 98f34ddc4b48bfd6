use crate::core::error::NetworkError;
use async_trait::async_trait;

/// Retrieves the body of a URL as text.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, NetworkError>;
}
