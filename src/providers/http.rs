use crate::core::config::HttpConfig;
use crate::core::{Fetcher, NetworkError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Plain GET client with a fixed timeout and a browser-like user agent.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(HttpFetcher { client })
    }
}

/// Decodes UTF-8, dropping invalid byte sequences instead of replacing them.
fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(name = "HttpFetch", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, NetworkError> {
        let request_error = |source| NetworkError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        debug!(len = bytes.len(), %status, "Received response");

        Ok(decode_ignoring_invalid(&bytes))
    }
}
