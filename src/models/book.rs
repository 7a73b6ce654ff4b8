//! Book rows and result pages as returned by the catalog endpoint.

use serde::{Deserialize, Serialize};

/// A single catalog record.
///
/// The engine never interprets these fields; they are carried from the wire to
/// the presentation layer untouched. Missing fields default instead of failing
/// the whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Record identifier (numeric or textual depending on the backend)
    #[serde(default)]
    pub id: serde_json::Value,

    /// Book title
    #[serde(rename = "book_title", default)]
    pub title: String,

    /// Author name
    #[serde(rename = "book_author", default)]
    pub author: String,

    /// Publication year (may be negative for ancient works)
    #[serde(rename = "book_publication_year", default)]
    pub publication_year: Option<i32>,

    /// Country of publication
    #[serde(rename = "book_publication_country", default)]
    pub publication_country: String,

    /// City of publication
    #[serde(rename = "book_publication_city", default)]
    pub publication_city: String,

    /// Number of pages
    #[serde(rename = "book_pages", default)]
    pub page_count: Option<u32>,
}

impl Book {
    /// Create a book with a title and author, leaving the rest empty
    pub fn new(
        id: impl Into<serde_json::Value>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            publication_year: None,
            publication_country: String::new(),
            publication_city: String::new(),
            page_count: None,
        }
    }
}

/// One page of records plus the total match count for its query.
///
/// `total_count` is query-wide: every page fetched under the same query
/// reports the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page-local records, in server order
    pub books: Vec<Book>,

    /// Total number of matches for the query
    #[serde(rename = "count")]
    pub total_count: u64,
}

impl PageResult {
    /// Create a page result
    pub fn new(books: Vec<Book>, total_count: u64) -> Self {
        Self { books, total_count }
    }

    /// A page for a query with no matches
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Whether the query matched nothing at all
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_result_from_wire() {
        let payload = json!({
            "books": [{
                "id": 2086,
                "book_author": "Homer",
                "book_title": "The Iliad",
                "book_publication_year": -750,
                "book_publication_country": "Greece",
                "book_publication_city": "Athens",
                "book_pages": 683
            }],
            "count": 57
        });
        let page: PageResult = serde_json::from_value(payload).unwrap();
        assert_eq!(page.total_count, 57);
        assert_eq!(page.books.len(), 1);
        assert_eq!(page.books[0].title, "The Iliad");
        assert_eq!(page.books[0].author, "Homer");
        assert_eq!(page.books[0].publication_year, Some(-750));
        assert_eq!(page.books[0].page_count, Some(683));
        assert_eq!(page.books[0].id, json!(2086));
    }

    #[test]
    fn test_missing_book_fields_default() {
        let page: PageResult =
            serde_json::from_value(json!({"books": [{"book_title": "Untitled"}], "count": 1}))
                .unwrap();
        assert_eq!(page.books[0].author, "");
        assert_eq!(page.books[0].page_count, None);
        assert!(page.books[0].id.is_null());
    }

    #[test]
    fn test_missing_count_is_rejected() {
        assert!(serde_json::from_value::<PageResult>(json!({"books": []})).is_err());
        assert!(serde_json::from_value::<PageResult>(json!({"count": 3})).is_err());
        assert!(serde_json::from_value::<PageResult>(json!({"books": [], "count": -1})).is_err());
    }

    #[test]
    fn test_empty_page() {
        assert!(PageResult::empty().is_empty());
        assert!(!PageResult::new(vec![Book::new(1, "A", "B")], 1).is_empty());
    }
}
