//! HTTP transport tests against a local mock server.

use bookshelf::config::{Config, EndpointConfig};
use bookshelf::engine::CatalogEngine;
use bookshelf::models::{NavigationState, RequestBuilder};
use bookshelf::navigation::MemoryNavigator;
use bookshelf::transport::{ErrorKind, FetchError, HttpTransport, SearchTransport};
use bookshelf::ViewState;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

const PAGE_TWO: &str = r#"{
    "books": [
        {
            "id": 21,
            "book_author": "Homer",
            "book_title": "The Odyssey",
            "book_publication_year": -700,
            "book_publication_country": "Greece",
            "book_publication_city": "Athens",
            "book_pages": 324
        }
    ],
    "count": 57
}"#;

fn endpoint(server: &mockito::Server) -> EndpointConfig {
    EndpointConfig {
        url: format!("{}/api/books", server.url()),
        timeout_seconds: 5,
        connect_timeout_seconds: 2,
    }
}

fn body(page: u32, query: &str) -> bookshelf::models::SearchBody {
    RequestBuilder::build(&NavigationState::new(page, query).unwrap())
}

#[tokio::test]
async fn test_unfiltered_body_and_page_decoding() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/books")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"page": 2})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PAGE_TWO)
        .create_async()
        .await;

    let transport = HttpTransport::new(&endpoint(&server)).unwrap();
    let page = transport.search(&body(2, "")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.total_count, 57);
    assert_eq!(page.books.len(), 1);
    assert_eq!(page.books[0].title, "The Odyssey");
    assert_eq!(page.books[0].author, "Homer");
    assert_eq!(page.books[0].page_count, Some(324));
}

#[tokio::test]
async fn test_filtered_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/books")
        .match_body(Matcher::Json(json!({
            "page": 1,
            "filters": [{"type": "all", "values": ["the iliad"]}]
        })))
        .with_status(200)
        .with_body(r#"{"books": [], "count": 0}"#)
        .create_async()
        .await;

    let transport = HttpTransport::new(&endpoint(&server)).unwrap();
    let page = transport.search(&body(1, "the iliad")).await.unwrap();

    mock.assert_async().await;
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_server_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/books")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let transport = HttpTransport::new(&endpoint(&server)).unwrap();
    let err = transport.search(&body(1, "")).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err, FetchError::Server(500));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/books")
        .with_status(200)
        .with_body(r#"{"books": "#)
        .create_async()
        .await;

    let transport = HttpTransport::new(&endpoint(&server)).unwrap();
    let err = transport.search(&body(1, "")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_engine_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/books")
        .match_body(Matcher::Json(json!({"page": 2})))
        .with_status(200)
        .with_body(PAGE_TWO)
        .expect(1)
        .create_async()
        .await;

    let mut config = Config::default();
    config.endpoint = endpoint(&server);
    let transport = Arc::new(HttpTransport::new(&config.endpoint).unwrap());
    let navigator = Arc::new(MemoryNavigator::new("?page=2&query="));
    let mut engine = CatalogEngine::new(&config, transport, navigator);

    let view = engine.refresh().await;
    let page = view.result().unwrap();
    assert_eq!(page.books[0].publication_year, Some(-700));
    assert_eq!(page.books[0].publication_city, "Athens");

    // Revisiting the page is served from the cache
    assert!(engine.on_address_change("?page=1&query=").is_some());
    let revisit = engine.on_address_change("?page=2&query=").unwrap().await;
    assert!(matches!(revisit, bookshelf::engine::FetchOutcome::Cached(_)));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_engine_connection_refused_is_network_error() {
    let mut config = Config::default();
    // Port 9 (discard) is almost never listening locally
    config.endpoint.url = "http://127.0.0.1:9/api/books".to_string();
    config.endpoint.connect_timeout_seconds = 1;
    config.retry.initial_delay_ms = 1;
    config.retry.max_delay_ms = 5;

    let transport = Arc::new(HttpTransport::new(&config.endpoint).unwrap());
    let navigator = Arc::new(MemoryNavigator::new("?page=1&query="));
    let mut engine = CatalogEngine::new(&config, transport, navigator);

    assert_eq!(engine.refresh().await, ViewState::Error(ErrorKind::Network));
    assert_eq!(engine.controller().in_flight(), 0);
}
