use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const ID_LENGTH: usize = 16;

/// Opaque identifier assigned to a book when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Draw a fresh 16-character URL-safe token.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token = (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalogued book as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub read_page: Option<u32>,
    /// Derived from `page_count == read_page` on every write.
    pub finished: bool,
    pub reading: Option<bool>,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    pub(crate) fn new(id: BookId, name: String, payload: BookPayload, now: OffsetDateTime) -> Self {
        let mut book = Self {
            id,
            name: String::new(),
            year: None,
            author: None,
            summary: None,
            publisher: None,
            page_count: None,
            read_page: None,
            finished: false,
            reading: None,
            inserted_at: now,
            updated_at: now,
        };
        book.apply(name, payload, now);
        book
    }

    /// Replace every caller-owned field; `id` and `inserted_at` are kept.
    pub(crate) fn apply(&mut self, name: String, payload: BookPayload, now: OffsetDateTime) {
        self.name = name;
        self.year = payload.year;
        self.author = payload.author;
        self.summary = payload.summary;
        self.publisher = payload.publisher;
        self.page_count = payload.page_count;
        self.read_page = payload.read_page;
        self.reading = payload.reading;
        self.finished = self.page_count == self.read_page;
        self.updated_at = now;
    }

    pub fn summary_view(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Request body for creating or replacing a book.
///
/// Every field is optional at the wire level; `name` presence and the
/// `readPage <= pageCount` relation are checked by the store. Unknown fields,
/// including a client-supplied `finished`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub read_page: Option<u32>,
    #[serde(default)]
    pub reading: Option<bool>,
}

/// Reduced projection returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: BookId,
    pub name: String,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreated {
    pub book_id: BookId,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookList {
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub book: Book,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_ids_use_url_safe_alphabet() {
        let id = BookId::generate();
        assert_eq!(id.as_str().len(), ID_LENGTH);
        assert!(id.as_str().bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn payload_reads_camel_case_and_ignores_finished() {
        let payload: BookPayload = serde_json::from_value(json!({
            "name": "Dune",
            "pageCount": 412,
            "readPage": 100,
            "finished": true
        }))
        .unwrap();

        assert_eq!(payload.name.as_deref(), Some("Dune"));
        assert_eq!(payload.page_count, Some(412));
        assert_eq!(payload.read_page, Some(100));
        assert_eq!(payload.reading, None);
    }

    #[test]
    fn book_serializes_with_camel_case_and_rfc3339_timestamps() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let book = Book::new(
            BookId::from("abc"),
            "Dune".to_string(),
            BookPayload {
                page_count: Some(412),
                read_page: Some(412),
                ..Default::default()
            },
            now,
        );

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["pageCount"], 412);
        assert_eq!(value["finished"], true);
        assert_eq!(value["insertedAt"], "1970-01-01T00:00:00Z");
        assert_eq!(value["publisher"], serde_json::Value::Null);
    }
}
