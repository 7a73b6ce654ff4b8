//! Utility modules supporting catalog fetches.
//!
//! - [`HttpClient`]: shared reqwest client configured from the endpoint settings
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute a fetch with automatic retry on network errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use bookshelf::transport::FetchError;
//! use bookshelf::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_page() -> Result<String, FetchError> { Ok("page".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), FetchError> {
//! let page = with_retry(RetryConfig::default(), || fetch_page()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{with_retry, RetryConfig};
