//! Navigation state: the (page, query) pair that determines what is displayed.

use serde::Serialize;

/// First page of every catalog listing.
pub const FIRST_PAGE: u32 = 1;

/// Canonical description of what the user is looking at.
///
/// Values are immutable; every navigation produces a new one. Pages are
/// 1-based and the constructor refuses page 0, so a `NavigationState` in hand
/// is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NavigationState {
    page: u32,
    query: String,
}

impl NavigationState {
    /// Create a navigation state, rejecting page numbers below 1
    pub fn new(page: u32, query: impl Into<String>) -> Result<Self, NavigationError> {
        if page < FIRST_PAGE {
            return Err(NavigationError::InvalidPage(page));
        }
        Ok(Self {
            page,
            query: query.into(),
        })
    }

    /// First page of the given query
    pub fn first_page(query: impl Into<String>) -> Self {
        Self {
            page: FIRST_PAGE,
            query: query.into(),
        }
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Free-text query term, empty when unfiltered
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether a filter term is active
    pub fn is_filtered(&self) -> bool {
        !self.query.is_empty()
    }

    /// Same query, different page
    pub fn with_page(&self, page: u32) -> Result<Self, NavigationError> {
        Self::new(page, self.query.clone())
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::first_page(String::new())
    }
}

impl std::fmt::Display for NavigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.query.is_empty() {
            write!(f, "page {}", self.page)
        } else {
            write!(f, "page {} of \"{}\"", self.page, self.query)
        }
    }
}

/// Errors raised when an intent cannot be turned into a navigation state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Page numbers start at 1
    #[error("Invalid page number: {0} (pages start at 1)")]
    InvalidPage(u32),
}
