//! In-memory book storage.
//!
//! The collection keeps insertion order. Lookups are linear scans. One
//! reader/writer lock guards the whole collection, so every operation
//! validates and mutates under a single guard.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use time::OffsetDateTime;

use super::models::{Book, BookId, BookPayload, BookSummary};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("missing name")]
    MissingName,

    #[error("readPage ({read_page}) exceeds pageCount ({page_count})")]
    ReadPageExceedsPageCount { read_page: u32, page_count: u32 },

    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("book storage unavailable: {0}")]
    Unavailable(String),
}

impl BookError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BookError::MissingName | BookError::ReadPageExceedsPageCount { .. }
        )
    }
}

pub type BookResult<T> = Result<T, BookError>;

/// Operations the books module needs from its storage backend.
pub trait BookRepository: Send + Sync {
    /// Validate and append a new book, returning its freshly assigned id.
    fn create(&self, payload: BookPayload) -> BookResult<BookId>;

    /// `{id, name, publisher}` of every book in insertion order.
    fn list_summaries(&self) -> BookResult<Vec<BookSummary>>;

    fn get_by_id(&self, id: &BookId) -> BookResult<Book>;

    /// Replace all fields except `id` and `insertedAt`. Existence is checked
    /// before the payload is validated.
    fn update_by_id(&self, id: &BookId, payload: BookPayload) -> BookResult<()>;

    fn delete_by_id(&self, id: &BookId) -> BookResult<()>;
}

/// Check the payload and hand back the validated name.
fn validate(payload: &BookPayload) -> BookResult<String> {
    let name = match payload.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(BookError::MissingName),
    };

    if let (Some(read_page), Some(page_count)) = (payload.read_page, payload.page_count) {
        if read_page > page_count {
            return Err(BookError::ReadPageExceedsPageCount {
                read_page,
                page_count,
            });
        }
    }

    Ok(name)
}

/// Process-local book collection.
#[derive(Debug, Default)]
pub struct BookStore {
    shelf: RwLock<Shelf>,
}

/// Live books in insertion order, plus every id ever handed out.
#[derive(Debug, Default)]
struct Shelf {
    books: Vec<Book>,
    issued: HashSet<BookId>,
}

impl Shelf {
    fn position(&self, id: &BookId) -> Option<usize> {
        self.books.iter().position(|book| &book.id == id)
    }

    /// Draws ids until one has never been issued, including to deleted books.
    fn issue_id(&mut self, mut generate: impl FnMut() -> BookId) -> BookId {
        loop {
            let id = generate();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> BookResult<usize> {
        Ok(self.read()?.books.len())
    }

    #[cfg(test)]
    fn is_empty(&self) -> BookResult<bool> {
        Ok(self.read()?.books.is_empty())
    }

    fn read(&self) -> BookResult<RwLockReadGuard<'_, Shelf>> {
        self.shelf
            .read()
            .map_err(|_| BookError::Unavailable("book collection lock poisoned".to_string()))
    }

    fn write(&self) -> BookResult<RwLockWriteGuard<'_, Shelf>> {
        self.shelf
            .write()
            .map_err(|_| BookError::Unavailable("book collection lock poisoned".to_string()))
    }
}

impl BookRepository for BookStore {
    fn create(&self, payload: BookPayload) -> BookResult<BookId> {
        let name = validate(&payload)?;
        let mut shelf = self.write()?;

        let id = shelf.issue_id(BookId::generate);
        shelf.books.push(Book::new(
            id.clone(),
            name,
            payload,
            OffsetDateTime::now_utc(),
        ));
        Ok(id)
    }

    fn list_summaries(&self) -> BookResult<Vec<BookSummary>> {
        Ok(self.read()?.books.iter().map(Book::summary_view).collect())
    }

    fn get_by_id(&self, id: &BookId) -> BookResult<Book> {
        self.read()?
            .books
            .iter()
            .find(|book| &book.id == id)
            .cloned()
            .ok_or_else(|| BookError::NotFound(id.clone()))
    }

    fn update_by_id(&self, id: &BookId, payload: BookPayload) -> BookResult<()> {
        let mut shelf = self.write()?;
        let index = shelf
            .position(id)
            .ok_or_else(|| BookError::NotFound(id.clone()))?;
        let name = validate(&payload)?;

        shelf.books[index].apply(name, payload, OffsetDateTime::now_utc());
        Ok(())
    }

    fn delete_by_id(&self, id: &BookId) -> BookResult<()> {
        let mut shelf = self.write()?;
        let index = shelf
            .position(id)
            .ok_or_else(|| BookError::NotFound(id.clone()))?;

        shelf.books.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: Some(name.to_string()),
            year: Some(1965),
            author: Some("Herbert".to_string()),
            summary: Some("Desert planet".to_string()),
            publisher: Some("Chilton".to_string()),
            page_count: Some(page_count),
            read_page: Some(read_page),
            reading: Some(false),
        }
    }

    #[test]
    fn create_assigns_unique_ids() {
        let store = BookStore::new();
        let ids: HashSet<BookId> = (0..200)
            .map(|i| store.create(payload(&format!("Book {i}"), 10, 1)).unwrap())
            .collect();

        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| !id.as_str().is_empty()));
        assert_eq!(store.len().unwrap(), 200);
    }

    #[test]
    fn create_stores_submitted_fields_and_derives_finished() {
        let store = BookStore::new();
        let submitted = payload("Dune", 412, 412);
        let id = store.create(submitted.clone()).unwrap();

        let book = store.get_by_id(&id).unwrap();
        assert_eq!(book.id, id);
        assert_eq!(book.name, "Dune");
        assert_eq!(book.year, submitted.year);
        assert_eq!(book.author, submitted.author);
        assert_eq!(book.summary, submitted.summary);
        assert_eq!(book.publisher, submitted.publisher);
        assert_eq!(book.page_count, Some(412));
        assert_eq!(book.read_page, Some(412));
        assert_eq!(book.reading, Some(false));
        assert!(book.finished);
        assert_eq!(book.inserted_at, book.updated_at);
    }

    #[test]
    fn unfinished_book_is_not_marked_finished() {
        let store = BookStore::new();
        let id = store.create(payload("Emma", 400, 12)).unwrap();
        assert!(!store.get_by_id(&id).unwrap().finished);
    }

    #[test]
    fn create_rejects_missing_or_empty_name() {
        let store = BookStore::new();

        let missing = BookPayload {
            name: None,
            ..payload("", 100, 50)
        };
        assert!(matches!(store.create(missing), Err(BookError::MissingName)));
        assert!(matches!(
            store.create(payload("", 100, 50)),
            Err(BookError::MissingName)
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn create_checks_name_before_page_relation() {
        let store = BookStore::new();
        let err = store.create(payload("", 10, 20)).unwrap_err();
        assert!(matches!(err, BookError::MissingName));
    }

    #[test]
    fn create_rejects_read_page_beyond_page_count() {
        let store = BookStore::new();
        let err = store.create(payload("Dune", 412, 500)).unwrap_err();

        assert!(matches!(
            err,
            BookError::ReadPageExceedsPageCount {
                read_page: 500,
                page_count: 412
            }
        ));
        assert!(err.is_validation());
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn page_relation_is_only_checked_when_both_counts_are_present() {
        let store = BookStore::new();
        let id = store
            .create(BookPayload {
                name: Some("Loose".to_string()),
                read_page: Some(30),
                ..Default::default()
            })
            .unwrap();

        let book = store.get_by_id(&id).unwrap();
        assert_eq!(book.page_count, None);
        assert!(!book.finished);
    }

    #[test]
    fn get_by_id_reports_missing_book() {
        let store = BookStore::new();
        let missing = BookId::from("does-not-exist");
        assert!(matches!(
            store.get_by_id(&missing),
            Err(BookError::NotFound(id)) if id == missing
        ));
    }

    #[test]
    fn list_summaries_preserves_creation_order() {
        let store = BookStore::new();
        assert!(store.list_summaries().unwrap().is_empty());

        let ids: Vec<BookId> = ["A", "B", "C"]
            .iter()
            .map(|name| store.create(payload(name, 10, 0)).unwrap())
            .collect();

        let summaries = store.list_summaries().unwrap();
        assert_eq!(summaries.len(), 3);
        for (summary, (id, name)) in summaries.iter().zip(ids.iter().zip(["A", "B", "C"])) {
            assert_eq!(&summary.id, id);
            assert_eq!(summary.name, name);
            assert_eq!(summary.publisher.as_deref(), Some("Chilton"));
        }
    }

    #[test]
    fn update_replaces_fields_and_keeps_identity() {
        let store = BookStore::new();
        let first = store.create(payload("Dune", 412, 10)).unwrap();
        let second = store.create(payload("Emma", 400, 0)).unwrap();
        let before = store.get_by_id(&first).unwrap();

        store
            .update_by_id(
                &first,
                BookPayload {
                    publisher: Some("Ace".to_string()),
                    ..payload("Dune Messiah", 256, 256)
                },
            )
            .unwrap();

        let after = store.get_by_id(&first).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.inserted_at, before.inserted_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.name, "Dune Messiah");
        assert_eq!(after.publisher.as_deref(), Some("Ace"));
        assert!(after.finished);

        let order: Vec<BookId> = store
            .list_summaries()
            .unwrap()
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn update_recomputes_finished() {
        let store = BookStore::new();
        let id = store.create(payload("Dune", 412, 412)).unwrap();

        store.update_by_id(&id, payload("Dune", 412, 200)).unwrap();
        assert!(!store.get_by_id(&id).unwrap().finished);
    }

    #[test]
    fn update_reports_missing_book_before_validating() {
        let store = BookStore::new();
        store.create(payload("Dune", 412, 10)).unwrap();

        let err = store
            .update_by_id(&BookId::from("nope"), payload("", 1, 5))
            .unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn rejected_update_leaves_record_unchanged() {
        let store = BookStore::new();
        let id = store.create(payload("Dune", 412, 412)).unwrap();
        let before = store.get_by_id(&id).unwrap();

        let err = store
            .update_by_id(&id, payload("Dune", 412, 500))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            store.update_by_id(&id, payload("", 412, 1)),
            Err(BookError::MissingName)
        ));

        assert_eq!(store.get_by_id(&id).unwrap(), before);
    }

    #[test]
    fn delete_removes_only_the_target() {
        let store = BookStore::new();
        let ids: Vec<BookId> = ["A", "B", "C"]
            .iter()
            .map(|name| store.create(payload(name, 10, 0)).unwrap())
            .collect();

        store.delete_by_id(&ids[1]).unwrap();

        let remaining: Vec<BookId> = store
            .list_summaries()
            .unwrap()
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone()]);
        assert!(matches!(
            store.get_by_id(&ids[1]),
            Err(BookError::NotFound(_))
        ));
    }

    #[test]
    fn delete_reports_missing_book() {
        let store = BookStore::new();
        store.create(payload("A", 10, 0)).unwrap();

        assert!(matches!(
            store.delete_by_id(&BookId::from("nope")),
            Err(BookError::NotFound(_))
        ));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn deleted_ids_are_never_issued_again() {
        let store = BookStore::new();
        let deleted = store.create(payload("Gone", 10, 0)).unwrap();
        store.delete_by_id(&deleted).unwrap();

        let mut shelf = store.write().unwrap();
        assert!(shelf.issued.contains(&deleted));

        let mut draws = vec![BookId::from("fresh"), deleted.clone()];
        let id = shelf.issue_id(|| draws.pop().unwrap());
        assert_eq!(id, BookId::from("fresh"));
        assert!(draws.is_empty());
    }

    #[test]
    fn poisoned_lock_surfaces_as_unavailable() {
        let store = std::sync::Arc::new(BookStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.shelf.write().unwrap();
            panic!("poison the collection lock");
        })
        .join();

        assert!(matches!(
            store.list_summaries(),
            Err(BookError::Unavailable(_))
        ));
    }
}
