//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::get,
    Json, Router,
};
use bookshelf_http::{ApiResponse, AppError};

use super::models::{BookCreated, BookDetail, BookId, BookList, BookPayload};
use super::store::{BookError, BookRepository};

pub type SharedRepository = Arc<dyn BookRepository>;

/// Which operation a store failure came from; selects the client message.
#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Fetch,
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Fetch => "fetch",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    fn reject(self, error: BookError) -> AppError {
        match error {
            BookError::MissingName => AppError::validation(format!(
                "Failed to {} book. Please provide the book name",
                self.verb()
            )),
            BookError::ReadPageExceedsPageCount { .. } => AppError::validation(format!(
                "Failed to {} book. readPage must not be greater than pageCount",
                self.verb()
            )),
            BookError::NotFound(_) => self.not_found(),
            error @ BookError::Unavailable(_) => AppError::Internal(error.into()),
        }
    }

    fn not_found(self) -> AppError {
        match self {
            Action::Add | Action::Fetch => AppError::not_found("Book not found"),
            Action::Update | Action::Delete => {
                AppError::not_found(format!("Failed to {} book. Id not found", self.verb()))
            }
        }
    }

    /// A path segment that cannot be decoded names no stored book.
    fn book_id(self, path: Result<Path<String>, PathRejection>) -> Result<BookId, AppError> {
        match path {
            Ok(Path(book_id)) => Ok(BookId::from(book_id)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "rejected book id");
                Err(self.not_found())
            }
        }
    }
}

/// Routes mounted under `/api/books`
pub fn router(store: SharedRepository) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{book_id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn create_book(
    State(store): State<SharedRepository>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<BookCreated>, AppError> {
    let Json(payload) = payload?;

    let book_id = store.create(payload).map_err(|e| Action::Add.reject(e))?;
    tracing::info!(book_id = %book_id, "book added");

    Ok(ApiResponse::created()
        .message("Book added successfully")
        .data(BookCreated { book_id }))
}

async fn list_books(
    State(store): State<SharedRepository>,
) -> Result<ApiResponse<BookList>, AppError> {
    let books = store
        .list_summaries()
        .map_err(|e| Action::Fetch.reject(e))?;

    Ok(ApiResponse::ok().data(BookList { books }))
}

async fn get_book(
    State(store): State<SharedRepository>,
    path: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<BookDetail>, AppError> {
    let book_id = Action::Fetch.book_id(path)?;
    let book = store
        .get_by_id(&book_id)
        .map_err(|e| Action::Fetch.reject(e))?;

    Ok(ApiResponse::ok().data(BookDetail { book }))
}

async fn update_book(
    State(store): State<SharedRepository>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let book_id = Action::Update.book_id(path)?;

    // A bad body for an unknown id still answers 404, matching the store's ordering.
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            store
                .get_by_id(&book_id)
                .map_err(|e| Action::Update.reject(e))?;
            return Err(rejection.into());
        }
    };

    store
        .update_by_id(&book_id, payload)
        .map_err(|e| Action::Update.reject(e))?;
    tracing::info!(book_id = %book_id, "book updated");

    Ok(ApiResponse::ok().message("Book updated successfully"))
}

async fn delete_book(
    State(store): State<SharedRepository>,
    path: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse, AppError> {
    let book_id = Action::Delete.book_id(path)?;

    store
        .delete_by_id(&book_id)
        .map_err(|e| Action::Delete.reject(e))?;
    tracing::info!(book_id = %book_id, "book deleted");

    Ok(ApiResponse::ok().message("Book deleted successfully"))
}
