//! Sequence-numbered fetches with cache short-circuit and in-flight dedup.
//!
//! Every submission takes the next request id and becomes the current one.
//! When a fetch completes, its outcome is committed only if no newer
//! submission happened in the meantime; otherwise it is dropped without
//! touching the cache or the view. Arrival order plays no part in this.
//!
//! All state sits behind `Rc<RefCell<_>>`: the controller runs on one logical
//! thread, and no borrow is held across an `.await`.

use futures_util::future::{self, FutureExt, LocalBoxFuture, Shared};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{FetchRequest, NavigationState, PageResult};
use crate::transport::{ErrorKind, FetchError, SearchTransport};
use crate::utils::{with_retry, RetryConfig};

use super::cache::{CacheKey, CacheStats, PageCache};
use super::view::{ViewInputs, ViewState, ViewStateReducer};

/// Future returned by [`FetchController::submit`]
pub type PendingFetch = LocalBoxFuture<'static, FetchOutcome>;

type SharedFetch = Shared<LocalBoxFuture<'static, Result<PageResult, FetchError>>>;

/// How a submission ended
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Served from the page cache; no network call was made
    Cached(PageResult),
    /// Fetched from the transport and committed
    Fetched(PageResult),
    /// The fetch failed and the failure was committed
    Failed(ErrorKind),
    /// A newer submission superseded this one; nothing was committed
    Superseded,
}

impl FetchOutcome {
    /// Committed page, if any
    pub fn result(&self) -> Option<&PageResult> {
        match self {
            FetchOutcome::Cached(result) | FetchOutcome::Fetched(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, FetchOutcome::Superseded)
    }
}

struct InFlight {
    /// Request id of the submission that dispatched it
    id: u64,
    fetch: SharedFetch,
    /// Pending futures still holding this fetch
    drivers: usize,
}

impl std::fmt::Debug for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("id", &self.id)
            .field("drivers", &self.drivers)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    last_request_id: u64,
    /// Latest submission; the only one allowed to commit
    current: Option<u64>,
    /// Set while a live future for the current submission waits on the
    /// network
    outstanding: bool,
    cache: PageCache,
    in_flight: HashMap<CacheKey, InFlight>,
    active: Option<(CacheKey, PageResult)>,
    last_error: Option<(CacheKey, ErrorKind)>,
}

/// Issues fetches and decides which completions still matter
#[derive(Debug, Clone)]
pub struct FetchController {
    transport: Arc<dyn SearchTransport>,
    retry: RetryConfig,
    state: Rc<RefCell<ControllerState>>,
}

impl FetchController {
    /// Create a controller with explicit retry settings and cache
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        retry: RetryConfig,
        cache: PageCache,
    ) -> Self {
        Self {
            transport,
            retry,
            state: Rc::new(RefCell::new(ControllerState {
                cache,
                ..ControllerState::default()
            })),
        }
    }

    /// Create a controller from application config
    pub fn from_config(config: &Config, transport: Arc<dyn SearchTransport>) -> Self {
        Self::new(
            transport,
            config.retry_config(),
            PageCache::from_config(&config.cache),
        )
    }

    /// Submit a fetch for `navigation`.
    ///
    /// Submission happens immediately: the request id is assigned, the cache is
    /// invalidated if the query changed, and a cache hit is committed on the
    /// spot. The returned future drives the network call (if any) and resolves
    /// once the outcome is known. A submission for a key already in flight
    /// shares that fetch instead of issuing a second one.
    pub fn submit(&self, navigation: &NavigationState) -> PendingFetch {
        let key = CacheKey::from(navigation);
        let mut state = self.state.borrow_mut();

        state.last_request_id += 1;
        let request = FetchRequest::new(state.last_request_id, navigation);
        let request_id = request.request_id;
        state.current = Some(request_id);
        state.last_error = None;

        tracing::debug!(
            request_id,
            page = request.page(),
            query = request.query(),
            "Submitting fetch"
        );

        if state.cache.observe_query(navigation.query()) {
            tracing::debug!("Query changed to {:?}; page cache cleared", navigation.query());
        }

        if let Some(result) = state.cache.get(&key) {
            state.outstanding = false;
            state.active = Some((key, result.clone()));
            return future::ready(FetchOutcome::Cached(result)).boxed_local();
        }

        state.outstanding = true;
        let attached = state.in_flight.get_mut(&key).map(|in_flight| {
            in_flight.drivers += 1;
            (in_flight.id, in_flight.fetch.clone())
        });
        let (fetch_id, fetch) = match attached {
            Some(attached) => {
                tracing::debug!(request_id, "Attaching to in-flight fetch for {}", key);
                attached
            }
            None => {
                let fetch = self.dispatch(&request);
                state.in_flight.insert(
                    key.clone(),
                    InFlight {
                        id: request_id,
                        fetch: fetch.clone(),
                        drivers: 1,
                    },
                );
                (request_id, fetch)
            }
        };
        drop(state);

        // Created outside the async block so that dropping an unpolled
        // future still runs its cleanup
        let mut driver = Driver {
            state: Rc::clone(&self.state),
            request_id,
            key,
            fetch_id,
            finished: false,
        };
        async move {
            let result = fetch.await;
            driver.finished = true;
            complete(&driver.state, request_id, driver.key.clone(), fetch_id, result)
        }
        .boxed_local()
    }

    fn dispatch(&self, request: &FetchRequest) -> SharedFetch {
        let transport = Arc::clone(&self.transport);
        let retry = self.retry;
        let body = request.body();

        async move {
            let transport = &transport;
            let body = &body;
            with_retry(retry, move || transport.search(body)).await
        }
        .boxed_local()
        .shared()
    }

    /// View state for the committed navigation
    pub fn view_state(&self, navigation: Option<&NavigationState>) -> ViewState {
        let state = self.state.borrow();
        ViewStateReducer::reduce(&ViewInputs {
            cache: &state.cache,
            navigation,
            active: state.active.as_ref().map(|(key, result)| (key, result)),
            last_error: state.last_error.as_ref().map(|(key, kind)| (key, *kind)),
        })
    }

    /// Whether the current submission is still waiting on the network
    pub fn is_outstanding(&self) -> bool {
        self.state.borrow().outstanding
    }

    /// Request id of the latest submission
    pub fn current_request_id(&self) -> Option<u64> {
        self.state.borrow().current
    }

    /// Number of distinct keys with a fetch in flight
    pub fn in_flight(&self) -> usize {
        self.state.borrow().in_flight.len()
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.state.borrow().cache.stats()
    }
}

/// Bookkeeping for one pending future.
///
/// When the future is dropped before its fetch finished, the shared fetch
/// loses a driver (and leaves `in_flight` once it has none), and the current
/// submission stops counting as outstanding so re-observing it resubmits.
struct Driver {
    state: Rc<RefCell<ControllerState>>,
    request_id: u64,
    key: CacheKey,
    fetch_id: u64,
    finished: bool,
}

impl Drop for Driver {
    fn drop(&mut self) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let released = match state.in_flight.get_mut(&self.key) {
            Some(in_flight) if in_flight.id == self.fetch_id => {
                in_flight.drivers = in_flight.drivers.saturating_sub(1);
                in_flight.drivers == 0
            }
            _ => false,
        };
        if released {
            tracing::debug!("Abandoning unfinished fetch for {}", self.key);
            state.in_flight.remove(&self.key);
        }

        if !self.finished && state.current == Some(self.request_id) {
            tracing::debug!(
                request_id = self.request_id,
                "Pending fetch for {} dropped before completion",
                self.key
            );
            state.outstanding = false;
        }
    }
}

fn complete(
    state: &Rc<RefCell<ControllerState>>,
    request_id: u64,
    key: CacheKey,
    fetch_id: u64,
    result: Result<PageResult, FetchError>,
) -> FetchOutcome {
    let mut state = state.borrow_mut();

    if state
        .in_flight
        .get(&key)
        .is_some_and(|in_flight| in_flight.id == fetch_id)
    {
        state.in_flight.remove(&key);
    }

    if state.current != Some(request_id) {
        tracing::debug!(
            request_id,
            current = ?state.current,
            "Discarding superseded response for {}",
            key
        );
        return FetchOutcome::Superseded;
    }

    state.outstanding = false;
    match result {
        Ok(result) => {
            tracing::info!(
                request_id,
                books = result.books.len(),
                total = result.total_count,
                "Committed page {}",
                key
            );
            state.cache.put(key.clone(), result.clone());
            state.active = Some((key, result.clone()));
            FetchOutcome::Fetched(result)
        }
        Err(error) => {
            tracing::warn!(request_id, "Fetch for {} failed: {}", key, error);
            let kind = error.kind();
            state.last_error = Some((key, kind));
            FetchOutcome::Failed(kind)
        }
    }
}
