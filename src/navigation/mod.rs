//! Address handling: codec, history seam and pagination intents.
//!
//! - [`NavigationCodec`]: address query string <-> [`NavigationState`](crate::models::NavigationState)
//! - [`Navigator`]: the routing/history collaborator (read current, push new)
//! - [`MemoryNavigator`]: in-memory history stack
//! - [`PaginationController`]: user intents -> pushed addresses

mod codec;
mod pagination;

pub use codec::NavigationCodec;
pub use pagination::{PageLinks, PaginationController};

use std::sync::{Mutex, PoisonError};

/// The routing/history collaborator.
///
/// The engine only ever reads the current address and pushes new ones; it
/// never owns history.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    /// Current address query string (e.g. `?page=2&query=homer`)
    fn current(&self) -> String;

    /// Push a new address onto history
    fn push(&self, address: &str);
}

#[derive(Debug, Default)]
struct History {
    entries: Vec<String>,
    position: usize,
}

/// History stack kept in memory.
///
/// Pushing truncates any forward entries, like a browser does.
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<History>,
}

impl MemoryNavigator {
    /// Start at the given address
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(History {
                entries: vec![initial.into()],
                position: 0,
            }),
        }
    }

    /// Step back one entry; returns the new current address, if any
    pub fn back(&self) -> Option<String> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.position == 0 {
            return None;
        }
        history.position -= 1;
        history.entries.get(history.position).cloned()
    }

    /// Step forward one entry; returns the new current address, if any
    pub fn forward(&self) -> Option<String> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.position + 1 >= history.entries.len() {
            return None;
        }
        history.position += 1;
        history.entries.get(history.position).cloned()
    }

    /// Number of entries in history
    pub fn len(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("")
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> String {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history
            .entries
            .get(history.position)
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, address: &str) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let keep = history.position + 1;
        history.entries.truncate(keep);
        history.entries.push(address.to_string());
        history.position = history.entries.len() - 1;
        tracing::debug!("Pushed address {}", address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_navigator_push_and_back() {
        let nav = MemoryNavigator::new("?page=1&query=");
        nav.push("?page=2&query=");
        nav.push("?page=3&query=");
        assert_eq!(nav.current(), "?page=3&query=");
        assert_eq!(nav.len(), 3);

        assert_eq!(nav.back().as_deref(), Some("?page=2&query="));
        assert_eq!(nav.current(), "?page=2&query=");
        assert_eq!(nav.forward().as_deref(), Some("?page=3&query="));
        assert_eq!(nav.forward(), None);
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let nav = MemoryNavigator::default();
        nav.push("?page=2&query=");
        nav.back();
        nav.push("?page=1&query=homer");
        assert_eq!(nav.len(), 2);
        assert_eq!(nav.forward(), None);
        assert_eq!(nav.current(), "?page=1&query=homer");
    }

    #[test]
    fn test_back_at_start() {
        let nav = MemoryNavigator::default();
        assert_eq!(nav.back(), None);
        assert_eq!(nav.current(), "");
    }
}
