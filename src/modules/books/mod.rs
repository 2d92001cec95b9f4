pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use routes::SharedRepository;
use store::BookStore;

/// Books module: CRUD over the in-memory book collection
pub struct BooksModule {
    store: SharedRepository,
}

impl BooksModule {
    /// Module backed by a fresh, empty in-memory store
    pub fn new() -> Self {
        Self::with_repository(Arc::new(BookStore::new()))
    }

    /// Module backed by the given repository
    pub fn with_repository(store: SharedRepository) -> Self {
        Self { store }
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn envelope_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Envelope" }
            }
        }
    })
}

fn book_id_parameter() -> serde_json::Value {
    json!({
        "name": "bookId",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn openapi_fragment() -> serde_json::Value {
    json!({
        "paths": {
            "/": collection_paths(),
            "/health": health_path(),
            "/{bookId}": item_paths()
        },
        "components": {
            "schemas": schemas()
        }
    })
}

fn collection_paths() -> serde_json::Value {
    json!({
        "get": {
            "summary": "List book summaries",
            "tags": ["Books"],
            "responses": {
                "200": {
                    "description": "Summaries of every book in insertion order",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/BookListEnvelope" }
                        }
                    }
                },
                "500": envelope_response("Internal server error")
            }
        },
        "post": {
            "summary": "Add a book",
            "tags": ["Books"],
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/BookPayload" }
                    }
                }
            },
            "responses": {
                "201": envelope_response("Book added; data.bookId holds the new id"),
                "400": envelope_response("Missing name, readPage greater than pageCount, or malformed body"),
                "500": envelope_response("Internal server error")
            }
        }
    })
}

fn health_path() -> serde_json::Value {
    json!({
        "get": {
            "summary": "Books health check",
            "tags": ["Books"],
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": { "type": "string" }
                        }
                    }
                }
            }
        }
    })
}

fn item_paths() -> serde_json::Value {
    json!({
        "get": {
            "summary": "Get a book by id",
            "tags": ["Books"],
            "parameters": [book_id_parameter()],
            "responses": {
                "200": {
                    "description": "The full book record under data.book",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/BookDetailEnvelope" }
                        }
                    }
                },
                "404": envelope_response("Book not found")
            }
        },
        "put": {
            "summary": "Replace a book",
            "tags": ["Books"],
            "parameters": [book_id_parameter()],
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/BookPayload" }
                    }
                }
            },
            "responses": {
                "200": envelope_response("Book updated"),
                "400": envelope_response("Missing name, readPage greater than pageCount, or malformed body"),
                "404": envelope_response("Id not found")
            }
        },
        "delete": {
            "summary": "Delete a book",
            "tags": ["Books"],
            "parameters": [book_id_parameter()],
            "responses": {
                "200": envelope_response("Book deleted"),
                "404": envelope_response("Id not found")
            }
        }
    })
}

fn schemas() -> serde_json::Value {
    json!({
        "BookPayload": {
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Required and non-empty" },
                "year": { "type": "integer" },
                "author": { "type": "string" },
                "summary": { "type": "string" },
                "publisher": { "type": "string" },
                "pageCount": { "type": "integer", "minimum": 0 },
                "readPage": { "type": "integer", "minimum": 0, "description": "Must not exceed pageCount" },
                "reading": { "type": "boolean" }
            },
            "required": ["name"]
        },
        "Book": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "16-character generated identifier" },
                "name": { "type": "string" },
                "year": { "type": "integer" },
                "author": { "type": "string" },
                "summary": { "type": "string" },
                "publisher": { "type": "string" },
                "pageCount": { "type": "integer" },
                "readPage": { "type": "integer" },
                "finished": { "type": "boolean", "description": "pageCount == readPage" },
                "reading": { "type": "boolean" },
                "insertedAt": { "type": "string", "format": "date-time" },
                "updatedAt": { "type": "string", "format": "date-time" }
            },
            "required": ["id", "name", "finished", "insertedAt", "updatedAt"]
        },
        "BookSummary": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" },
                "publisher": { "type": "string" }
            },
            "required": ["id", "name"]
        },
        "BookListEnvelope": {
            "type": "object",
            "properties": {
                "status": { "type": "string" },
                "data": {
                    "type": "object",
                    "properties": {
                        "books": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/BookSummary" }
                        }
                    }
                }
            }
        },
        "BookDetailEnvelope": {
            "type": "object",
            "properties": {
                "status": { "type": "string" },
                "data": {
                    "type": "object",
                    "properties": {
                        "book": { "$ref": "#/components/schemas/Book" }
                    }
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
