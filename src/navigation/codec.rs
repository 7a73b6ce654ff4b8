//! Address query string <-> [`NavigationState`] conversion.
//!
//! Two parameters are recognised: `page` (positive integer, default 1) and
//! `query` (arbitrary text, default empty). Serialization always emits both in
//! that order so back/forward navigation sees identical addresses for
//! identical states.

use crate::models::{NavigationState, FIRST_PAGE};

const PAGE_PARAM: &str = "page";
const QUERY_PARAM: &str = "query";

/// Parses and serializes address query strings
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationCodec;

impl NavigationCodec {
    /// Parse an address query string, with or without its leading `?`.
    ///
    /// Never fails: absent, non-numeric or sub-1 pages normalise to page 1 and
    /// an absent query means "unfiltered".
    pub fn parse(address_query: &str) -> NavigationState {
        let raw = address_query.strip_prefix('?').unwrap_or(address_query);

        let mut page: Option<String> = None;
        let mut query: Option<String> = None;

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                PAGE_PARAM if page.is_none() => page = Some(value.into_owned()),
                QUERY_PARAM if query.is_none() => query = Some(value.into_owned()),
                _ => {}
            }
        }

        let page = page.as_deref().map(parse_page).unwrap_or(FIRST_PAGE);
        let query = query.unwrap_or_default();

        NavigationState::new(page, query.clone())
            .unwrap_or_else(|_| NavigationState::first_page(query))
    }

    /// Serialize a state into `page=<n>&query=<term>` with the term
    /// percent-encoded
    pub fn serialize(state: &NavigationState) -> String {
        format!(
            "{}={}&{}={}",
            PAGE_PARAM,
            state.page(),
            QUERY_PARAM,
            urlencoding::encode(state.query())
        )
    }

    /// Serialized state with a leading `?`, ready to push onto history
    pub fn to_address(state: &NavigationState) -> String {
        format!("?{}", Self::serialize(state))
    }
}

fn parse_page(raw: &str) -> u32 {
    let raw = raw.trim();

    // Plain numerals too large for u32 saturate
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let page = raw.parse::<u32>().unwrap_or(u32::MAX);
        if page < FIRST_PAGE {
            tracing::debug!("Clamping out-of-range page {} to {}", page, FIRST_PAGE);
            return FIRST_PAGE;
        }
        return page;
    }

    match raw.parse::<i64>() {
        Ok(n) if n >= i64::from(FIRST_PAGE) => u32::try_from(n).unwrap_or(u32::MAX),
        Ok(n) => {
            tracing::debug!("Clamping out-of-range page {} to {}", n, FIRST_PAGE);
            FIRST_PAGE
        }
        Err(_) => {
            tracing::debug!("Ignoring non-numeric page {:?}", raw);
            FIRST_PAGE
        }
    }
}
