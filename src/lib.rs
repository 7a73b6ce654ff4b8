//! # Bookshelf
//!
//! A paginated book catalog client whose navigation lives in an address query
//! string (`?page=N&query=TERM`).
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (NavigationState, Book, PageResult, search bodies)
//! - [`navigation`]: Address codec, navigator abstraction and pagination intents
//! - [`engine`]: Fetch controller, page cache and view state reduction
//! - [`transport`]: Search backends (HTTP and scripted mock)
//! - [`utils`]: HTTP client and retry helpers
//! - [`config`]: Configuration management

pub mod config;
pub mod engine;
pub mod models;
pub mod navigation;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use engine::{CatalogEngine, ViewState};
pub use models::{Book, NavigationState, PageResult};
pub use transport::{FetchError, SearchTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
