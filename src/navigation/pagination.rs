//! Pagination intents and the pager window.

use serde::Serialize;
use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::models::{NavigationError, NavigationState, FIRST_PAGE};

use super::{NavigationCodec, Navigator};

/// Links a pager control should render around the active page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// Page being shown. It can lie past `total_pages`, in which case no
    /// entry of `pages` is active
    pub active: u32,
    /// Numbered links in the window, ascending
    pub pages: Vec<u32>,
    pub first: Option<u32>,
    pub previous: Option<u32>,
    pub next: Option<u32>,
    pub last: Option<u32>,
    pub total_pages: u32,
}

/// Translates user intents into new addresses.
///
/// The controller never changes engine state itself: it pushes the new address
/// to the [`Navigator`] and the engine picks it up as an observed change.
#[derive(Debug, Clone)]
pub struct PaginationController {
    navigator: Arc<dyn Navigator>,
    page_size: u32,
    page_range: u32,
}

impl PaginationController {
    pub fn new(navigator: Arc<dyn Navigator>, config: &PaginationConfig) -> Self {
        Self {
            navigator,
            page_size: config.page_size.max(1),
            page_range: config.page_range.max(1),
        }
    }

    /// Navigation state the navigator currently points at
    pub fn current(&self) -> NavigationState {
        NavigationCodec::parse(&self.navigator.current())
    }

    /// A new search always starts from page 1; the term is used as typed
    pub fn on_search_submit(&self, term: &str) -> NavigationState {
        let state = NavigationState::first_page(term);
        self.push(&state);
        state
    }

    /// Move to page `n`, keeping the active query
    pub fn on_page_select(&self, page: u32) -> Result<NavigationState, NavigationError> {
        let state = self.current().with_page(page)?;
        self.push(&state);
        Ok(state)
    }

    fn push(&self, state: &NavigationState) {
        tracing::debug!("Navigating to {}", state);
        self.navigator.push(&NavigationCodec::to_address(state));
    }

    /// Number of pages needed for `total_count` records
    pub fn total_pages(&self, total_count: u64) -> u32 {
        let pages = total_count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Pager window centred on `active`, or ending at the last page when
    /// `active` is beyond it
    pub fn page_links(&self, active: u32, total_count: u64) -> PageLinks {
        let active = active.max(FIRST_PAGE);
        let total_pages = self.total_pages(total_count);
        if total_pages == 0 {
            return PageLinks {
                active,
                pages: Vec::new(),
                first: None,
                previous: None,
                next: None,
                last: None,
                total_pages,
            };
        }

        let centre = active.min(total_pages);
        let span = self.page_range.min(total_pages);

        let mut start = centre.saturating_sub(self.page_range / 2).max(FIRST_PAGE);
        let mut end = start.saturating_add(span - 1);
        if end > total_pages {
            end = total_pages;
            start = end - (span - 1);
        }

        PageLinks {
            active,
            pages: (start..=end).collect(),
            first: (active > FIRST_PAGE).then_some(FIRST_PAGE),
            previous: (active > FIRST_PAGE).then(|| (active - 1).min(total_pages)),
            next: (active < total_pages).then(|| active + 1),
            last: (active != total_pages).then_some(total_pages),
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryNavigator;

    fn controller(start: &str) -> (Arc<MemoryNavigator>, PaginationController) {
        let navigator = Arc::new(MemoryNavigator::new(start));
        let pagination = PaginationController::new(navigator.clone(), &PaginationConfig::default());
        (navigator, pagination)
    }

    #[test]
    fn test_search_submit_resets_page() {
        let (navigator, pagination) = controller("?page=5&query=homer");
        let state = pagination.on_search_submit("xyz123");
        assert_eq!(state, NavigationState::new(1, "xyz123").unwrap());
        assert_eq!(navigator.current(), "?page=1&query=xyz123");
    }

    #[test]
    fn test_search_submit_keeps_term_verbatim() {
        let (navigator, pagination) = controller("");
        assert_eq!(pagination.on_search_submit("  homer ").query(), "  homer ");
        assert_eq!(navigator.current(), "?page=1&query=%20%20homer%20");
    }

    #[test]
    fn test_page_select_preserves_query() {
        let (navigator, pagination) = controller("?page=1&query=the%20iliad");
        let state = pagination.on_page_select(3).unwrap();
        assert_eq!(state, NavigationState::new(3, "the iliad").unwrap());
        assert_eq!(navigator.current(), "?page=3&query=the%20iliad");
    }

    #[test]
    fn test_page_select_rejects_zero() {
        let (navigator, pagination) = controller("?page=2&query=");
        assert_eq!(
            pagination.on_page_select(0),
            Err(NavigationError::InvalidPage(0))
        );
        assert_eq!(navigator.current(), "?page=2&query=");
        assert_eq!(navigator.len(), 1);
    }

    #[test]
    fn test_total_pages() {
        let (_, pagination) = controller("");
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(20), 1);
        assert_eq!(pagination.total_pages(21), 2);
        assert_eq!(pagination.total_pages(57), 3);
    }

    #[test]
    fn test_page_links_window_centred() {
        let (_, pagination) = controller("");
        let links = pagination.page_links(6, 200);
        assert_eq!(links.pages, vec![4, 5, 6, 7, 8]);
        assert_eq!(links.previous, Some(5));
        assert_eq!(links.next, Some(7));
        assert_eq!(links.first, Some(1));
        assert_eq!(links.last, Some(10));
    }

    #[test]
    fn test_page_links_edges() {
        let (_, pagination) = controller("");

        let first = pagination.page_links(1, 200);
        assert_eq!(first.pages, vec![1, 2, 3, 4, 5]);
        assert_eq!(first.previous, None);
        assert_eq!(first.first, None);

        let last = pagination.page_links(10, 200);
        assert_eq!(last.pages, vec![6, 7, 8, 9, 10]);
        assert_eq!(last.next, None);
        assert_eq!(last.last, None);

    }

    #[test]
    fn test_page_links_beyond_last_page() {
        let (_, pagination) = controller("");
        let beyond = pagination.page_links(99, 57);

        assert_eq!(beyond.active, 99);
        assert_eq!(beyond.pages, vec![1, 2, 3]);
        assert!(!beyond.pages.contains(&beyond.active));
        assert_eq!(beyond.previous, Some(3));
        assert_eq!(beyond.next, None);
        assert_eq!(beyond.last, Some(3));
        assert_eq!(beyond.first, Some(1));
    }

    #[test]
    fn test_page_links_fewer_pages_than_window() {
        let (_, pagination) = controller("");
        let links = pagination.page_links(2, 57);
        assert_eq!(links.pages, vec![1, 2, 3]);
        assert_eq!(links.total_pages, 3);

        let none = pagination.page_links(1, 0);
        assert!(none.pages.is_empty());
        assert_eq!(none.next, None);
    }
}
