//! reqwest-backed transport for the catalog search endpoint.

use async_trait::async_trait;

use crate::config::EndpointConfig;
use crate::models::{PageResult, SearchBody};
use crate::transport::{FetchError, SearchTransport};
use crate::utils::HttpClient;

/// POSTs search bodies as JSON to one endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
    url: String,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, FetchError> {
        Ok(Self::with_client(HttpClient::new(endpoint)?, &endpoint.url))
    }

    /// Create a transport sharing an existing client
    pub fn with_client(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Endpoint this transport talks to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn search(&self, body: &SearchBody) -> Result<PageResult, FetchError> {
        tracing::debug!("POST {} page={}", self.url, body.page);

        let response = self.client.client().post(&self.url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Endpoint answered {}", status);
            return Err(FetchError::Server(status.as_u16()));
        }

        let text = response.text().await?;
        let page: PageResult = serde_json::from_str(&text)?;

        tracing::debug!(
            "Received {} books (total {})",
            page.books.len(),
            page.total_count
        );
        Ok(page)
    }
}
