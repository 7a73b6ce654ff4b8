//! Mock transport for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use crate::models::{Book, PageResult, SearchBody};
use crate::transport::{FetchError, SearchTransport};

type Key = (String, u32);

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<Key, VecDeque<Result<PageResult, FetchError>>>,
    holds: HashMap<Key, Arc<Notify>>,
    delays: HashMap<Key, Duration>,
    calls: Vec<SearchBody>,
}

/// A transport that answers from scripted responses.
///
/// Responses are keyed by (query, page). Several responses queued for one key
/// are served in order and the last one repeats. Unscripted keys answer with
/// an empty page.
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a successful page for (query, page).
    pub fn respond(&self, query: &str, page: u32, result: PageResult) {
        self.enqueue(query, page, Ok(result));
    }

    /// Queue a failure for (query, page).
    pub fn fail(&self, query: &str, page: u32, error: FetchError) {
        self.enqueue(query, page, Err(error));
    }

    fn enqueue(&self, query: &str, page: u32, result: Result<PageResult, FetchError>) {
        self.state()
            .responses
            .entry((query.to_string(), page))
            .or_default()
            .push_back(result);
    }

    /// Hold the next request for (query, page) until the returned handle is
    /// notified.
    pub fn hold(&self, query: &str, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state()
            .holds
            .insert((query.to_string(), page), Arc::clone(&gate));
        gate
    }

    /// Delay every answer for (query, page).
    pub fn delay(&self, query: &str, page: u32, delay: Duration) {
        self.state()
            .delays
            .insert((query.to_string(), page), delay);
    }

    /// All request bodies received so far, in arrival order.
    pub fn calls(&self) -> Vec<SearchBody> {
        self.state().calls.clone()
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Number of requests received for (query, page).
    pub fn calls_for(&self, query: &str, page: u32) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|body| key_of(body) == (query.to_string(), page))
            .count()
    }
}

fn key_of(body: &SearchBody) -> Key {
    let query = body
        .filters
        .as_ref()
        .and_then(|filters| filters.first())
        .and_then(|filter| filter.values.first())
        .cloned()
        .unwrap_or_default();
    (query, body.page)
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn search(&self, body: &SearchBody) -> Result<PageResult, FetchError> {
        let key = key_of(body);

        let (gate, delay) = {
            let mut state = self.state();
            state.calls.push(body.clone());
            (state.holds.remove(&key), state.delays.get(&key).copied())
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        match state.responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Ok(PageResult::empty())),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(PageResult::empty())),
            None => Ok(PageResult::empty()),
        }
    }
}

/// Helper to build a page of numbered books for tests.
pub fn make_page(first_id: u64, len: usize, total_count: u64) -> PageResult {
    let books = (0..len as u64)
        .map(|i| {
            let id = first_id + i;
            Book::new(id, format!("Book {}", id), format!("Author {}", id))
        })
        .collect();
    PageResult::new(books, total_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NavigationState, RequestBuilder};

    fn body(page: u32, query: &str) -> SearchBody {
        RequestBuilder::build(&NavigationState::new(page, query).unwrap())
    }

    #[tokio::test]
    async fn test_unscripted_key_answers_empty() {
        let mock = MockTransport::new();
        let page = mock.search(&body(1, "")).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_queued_responses_then_last_repeats() {
        let mock = MockTransport::new();
        mock.fail("homer", 1, FetchError::Network("refused".into()));
        mock.respond("homer", 1, make_page(1, 2, 2));

        assert!(mock.search(&body(1, "homer")).await.is_err());
        assert_eq!(mock.search(&body(1, "homer")).await.unwrap().books.len(), 2);
        assert_eq!(mock.search(&body(1, "homer")).await.unwrap().books.len(), 2);
        assert_eq!(mock.calls_for("homer", 1), 3);
        assert_eq!(mock.calls_for("", 1), 0);
    }

    #[tokio::test]
    async fn test_hold_releases_on_notify() {
        let mock = MockTransport::new();
        mock.respond("", 2, make_page(21, 20, 57));
        let gate = mock.hold("", 2);
        gate.notify_one();

        let page = mock.search(&body(2, "")).await.unwrap();
        assert_eq!(page.books[0].title, "Book 21");
    }
}
