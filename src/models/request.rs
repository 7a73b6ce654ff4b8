//! Wire request bodies for the catalog search endpoint.

use serde::{Deserialize, Serialize};

use super::NavigationState;

/// Kind of filter clause understood by the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Match the values against every searchable field
    All,
}

/// A single filter clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub values: Vec<String>,
}

impl Filter {
    /// Free-text match across all searchable fields
    pub fn all(term: impl Into<String>) -> Self {
        Self {
            filter_type: FilterType::All,
            values: vec![term.into()],
        }
    }
}

/// JSON body POSTed to the search endpoint.
///
/// `filters` is left out of the JSON entirely when there is no query term;
/// the endpoint distinguishes "no filters" from an empty filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBody {
    pub page: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
}

/// Turns navigation states into search bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBuilder;

impl RequestBuilder {
    /// Build the wire body for a navigation state
    pub fn build(state: &NavigationState) -> SearchBody {
        let filters = state
            .is_filtered()
            .then(|| vec![Filter::all(state.query())]);

        SearchBody {
            page: state.page(),
            filters,
        }
    }
}

/// A sequence-numbered description of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Monotonic submission number; the sole arbiter of staleness
    pub request_id: u64,
    navigation: NavigationState,
}

impl FetchRequest {
    /// Create a request for a navigation state
    pub fn new(request_id: u64, navigation: &NavigationState) -> Self {
        Self {
            request_id,
            navigation: navigation.clone(),
        }
    }

    pub fn page(&self) -> u32 {
        self.navigation.page()
    }

    pub fn query(&self) -> &str {
        self.navigation.query()
    }

    /// Wire body for this request
    pub fn body(&self) -> SearchBody {
        RequestBuilder::build(&self.navigation)
    }
}
