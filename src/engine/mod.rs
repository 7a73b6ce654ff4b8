//! The query-synchronized paginated fetch/cache engine.
//!
//! Data flows one way: an observed address is parsed into a
//! [`NavigationState`], submitted to the [`FetchController`], and the result
//! is read back as a [`ViewState`]. User intents go through the
//! [`PaginationController`], which only pushes addresses; the engine sees
//! them when the new address is observed.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bookshelf::config::Config;
//! use bookshelf::engine::CatalogEngine;
//! use bookshelf::navigation::MemoryNavigator;
//! use bookshelf::transport::HttpTransport;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let transport = Arc::new(HttpTransport::new(&config.endpoint)?);
//! let navigator = Arc::new(MemoryNavigator::new("?page=2&query=homer"));
//! let mut engine = CatalogEngine::new(&config, transport, navigator);
//!
//! let view = engine.refresh().await;
//! println!("{:?}", view);
//! # Ok(())
//! # }
//! ```

mod cache;
mod controller;
mod view;

pub use cache::{CacheKey, CacheStats, PageCache};
pub use controller::{FetchController, FetchOutcome, PendingFetch};
pub use view::{ViewInputs, ViewState, ViewStateReducer};

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::models::NavigationState;
use crate::navigation::{NavigationCodec, Navigator, PageLinks, PaginationController};
use crate::transport::SearchTransport;

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A new navigation was committed; the presentation should reset its
    /// scroll position
    NavigationCommitted(NavigationState),
}

/// Owns the fetch controller and the committed navigation.
///
/// The engine is single-threaded (`!Send`); drive it from one task.
#[derive(Debug)]
pub struct CatalogEngine {
    controller: FetchController,
    navigator: Arc<dyn Navigator>,
    pagination: PaginationController,
    navigation: Option<NavigationState>,
    subscribers: Vec<mpsc::UnboundedSender<EngineEvent>>,
}

impl CatalogEngine {
    /// Create an engine
    pub fn new(
        config: &Config,
        transport: Arc<dyn SearchTransport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            controller: FetchController::from_config(config, transport),
            pagination: PaginationController::new(Arc::clone(&navigator), &config.pagination),
            navigator,
            navigation: None,
            subscribers: Vec::new(),
        }
    }

    /// Receive engine events
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// React to an observed address.
    ///
    /// Returns `None` when the address maps to the navigation already shown
    /// or loading. An address whose last fetch failed is submitted again, so
    /// re-observing it acts as a retry. The same goes for an address still
    /// `Loading` whose pending fetch was dropped before completing.
    pub fn on_address_change(&mut self, address: &str) -> Option<PendingFetch> {
        let next = NavigationCodec::parse(address);

        if self.navigation.as_ref() == Some(&next) {
            let view = self.view_state();
            let stalled = view.is_loading() && !self.controller.is_outstanding();
            if !view.is_error() && !stalled {
                tracing::debug!("Address unchanged ({}); nothing to fetch", next);
                return None;
            }
        }

        tracing::info!("Navigation committed: {}", next);
        self.navigation = Some(next.clone());
        self.notify(EngineEvent::NavigationCommitted(next.clone()));

        Some(self.controller.submit(&next))
    }

    /// Observe the navigator's current address and wait for its fetch
    pub async fn refresh(&mut self) -> ViewState {
        let address = self.navigator.current();
        if let Some(pending) = self.on_address_change(&address) {
            let outcome = pending.await;
            tracing::debug!(superseded = outcome.is_superseded(), "Fetch finished");
        }
        self.view_state()
    }

    fn notify(&mut self, event: EngineEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Render-ready state for the committed navigation
    pub fn view_state(&self) -> ViewState {
        self.controller.view_state(self.navigation.as_ref())
    }

    /// Committed navigation, `None` before the first address was observed
    pub fn navigation(&self) -> Option<&NavigationState> {
        self.navigation.as_ref()
    }

    /// Intent handling for search and page selection
    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    /// Pager window for the page currently shown
    pub fn page_links(&self) -> Option<PageLinks> {
        let navigation = self.navigation.as_ref()?;
        let total_count = match self.view_state() {
            ViewState::Success(result) => result.total_count,
            ViewState::Empty => 0,
            _ => return None,
        };
        Some(self.pagination.page_links(navigation.page(), total_count))
    }

    /// Whether the current navigation is waiting on the network
    pub fn is_loading(&self) -> bool {
        self.controller.is_outstanding()
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.controller.cache_stats()
    }

    /// The underlying fetch controller
    pub fn controller(&self) -> &FetchController {
        &self.controller
    }
}
