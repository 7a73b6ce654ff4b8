//! Render-ready view state derived from engine state.

use serde::Serialize;

use crate::models::{NavigationState, PageResult};
use crate::transport::ErrorKind;

use super::cache::{CacheKey, PageCache};

/// What the presentation layer should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing has been requested yet
    Idle,
    /// The current navigation has no result yet
    Loading,
    /// A page with at least one match
    Success(PageResult),
    /// The query matched nothing
    Empty,
    /// The latest relevant fetch for the current navigation failed
    Error(ErrorKind),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }

    /// Page shown, if any
    pub fn result(&self) -> Option<&PageResult> {
        match self {
            ViewState::Success(result) => Some(result),
            _ => None,
        }
    }
}

/// Everything the reducer looks at, borrowed from the controller
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a> {
    pub cache: &'a PageCache,
    /// Committed navigation; `None` before the first submission
    pub navigation: Option<&'a NavigationState>,
    /// Most recent relevant successful result
    pub active: Option<(&'a CacheKey, &'a PageResult)>,
    /// Most recent relevant failure
    pub last_error: Option<(&'a CacheKey, ErrorKind)>,
}

/// Pure mapping from engine state to [`ViewState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewStateReducer;

impl ViewStateReducer {
    /// Derive the view state.
    ///
    /// A committed navigation with neither a result nor an error for its key is
    /// loading: its request is either in flight or about to be reissued.
    pub fn reduce(inputs: &ViewInputs<'_>) -> ViewState {
        let Some(navigation) = inputs.navigation else {
            return ViewState::Idle;
        };
        let key = CacheKey::from(navigation);

        let result = inputs
            .active
            .filter(|(active_key, _)| **active_key == key)
            .map(|(_, result)| result)
            .or_else(|| inputs.cache.peek(&key));

        if let Some(result) = result {
            return if result.is_empty() {
                ViewState::Empty
            } else {
                ViewState::Success(result.clone())
            };
        }

        match inputs.last_error {
            Some((error_key, kind)) if *error_key == key => ViewState::Error(kind),
            _ => ViewState::Loading,
        }
    }
}
