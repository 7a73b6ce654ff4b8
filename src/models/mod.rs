//! Core data models for catalog navigation and search.

mod book;
mod navigation;
mod request;

pub use book::{Book, PageResult};
pub use navigation::{NavigationError, NavigationState, FIRST_PAGE};
pub use request::{FetchRequest, Filter, FilterType, RequestBuilder, SearchBody};
