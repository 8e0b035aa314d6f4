//! HTTP client for the ADE anonymous export.

use reqwest::{Client, Response, StatusCode};
use tracing::{trace, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

use super::config::AdeConfig;

/// HTTP client for ADE calendar downloads.
#[derive(Debug, Clone)]
pub struct AdeClient {
    client: Client,
    config: AdeConfig,
}

impl AdeClient {
    /// Creates a new ADE client with the given configuration.
    pub fn new(config: AdeConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::network(format!("Failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Performs a GET request and returns the body.
    pub async fn get(&self, url: &Url) -> ProviderResult<String> {
        trace!(url = %url, "Sending request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("Request failed: {}", e)).with_source(e))?;

        Self::handle_response(response).await
    }

    /// Maps the HTTP status to a result and extracts the body.
    async fn handle_response(response: Response) -> ProviderResult<String> {
        let status = response.status();
        trace!(status = %status, "Received response");

        match status {
            StatusCode::OK => response.text().await.map_err(|e| {
                ProviderError::network(format!("Failed to read response: {}", e)).with_source(e)
            }),
            StatusCode::NOT_FOUND => Err(ProviderError::not_found("Calendar export not found")),
            s if s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::server(format!(
                    "Server error ({}): {}",
                    s, body
                )))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %s, body = %body, "Unexpected response status");
                Err(ProviderError::invalid_response(format!(
                    "Unexpected status {}: {}",
                    s, body
                )))
            }
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AdeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn client_creation() {
        let config = AdeConfig::new(AdeConfig::DEFAULT_URL)
            .unwrap()
            .with_timeout(Duration::from_secs(10));

        let client = AdeClient::new(config).unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(10));
    }
}
