//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;

use crate::config::EndpointConfig;
use crate::transport::FetchError;

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client tuned for the given endpoint settings
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, FetchError> {
        Self::with_user_agent(
            endpoint,
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Create a client with a custom user agent
    pub fn with_user_agent(
        endpoint: &EndpointConfig,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(endpoint.timeout())
            .connect_timeout(endpoint.connect_timeout())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
