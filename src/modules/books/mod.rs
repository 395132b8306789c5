pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{middleware::from_fn_with_state, Router};
use bookshelf_authz::{require_token, TokenService};
use bookshelf_kernel::{settings::BookSettings, InitCtx, Module};

use routes::BooksState;
use store::BookStore;

/// Catalogue module: list, fetch and create books, optionally behind the token gate
pub struct BooksModule {
    state: BooksState,
    gate: Option<TokenService>,
}

impl BooksModule {
    pub fn new(store: BookStore, settings: &BookSettings, gate: Option<TokenService>) -> Self {
        Self {
            state: BooksState {
                store,
                list_on_zero_id: settings.list_on_zero_id,
            },
            gate,
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.state.store.len().await;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books,
            gated = self.gate.is_some(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let router = routes::router(self.state.clone());
        match &self.gate {
            Some(tokens) => router.route_layer(from_fn_with_state(tokens.clone(), require_token)),
            None => router,
        }
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let security = if self.gate.is_some() {
            serde_json::json!([{ "tokenCookie": [] }])
        } else {
            serde_json::json!([])
        };

        Some(serde_json::json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "security": security,
                        "responses": {
                            "200": {
                                "description": "All books in insertion order",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "401": { "description": "Missing, invalid or expired token" }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": security,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "The created book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": { "description": "Malformed body, or title/author missing" },
                            "401": { "description": "Missing, invalid or expired token" }
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book by id; id 0 lists every book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": { "description": "Invalid book ID" },
                            "401": { "description": "Missing, invalid or expired token" },
                            "404": { "description": "Book not found" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "minimum": 1 },
                            "title": { "type": "string" },
                            "author": { "type": "string" }
                        },
                        "required": ["id", "title", "author"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" }
                        },
                        "required": ["title", "author"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let books = self.state.store.len().await;
        tracing::info!(
            module = self.name(),
            books,
            "books module stopped"
        );
        Ok(())
    }
}

/// Create the books module, seeding the store when configured to
pub fn create_module(settings: &BookSettings, gate: Option<TokenService>) -> Arc<BooksModule> {
    let store = if settings.seed {
        BookStore::seeded()
    } else {
        BookStore::new()
    };
    Arc::new(BooksModule::new(store, settings, gate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_kernel::settings::Settings;

    #[tokio::test]
    async fn lifecycle_hooks_run_on_spawned_tasks() {
        let module = create_module(&BookSettings::default(), None);

        let handle = tokio::spawn(async move {
            let settings = Settings::default();
            let ctx = InitCtx {
                settings: &settings,
            };
            module.init(&ctx).await?;
            module.stop().await
        });

        handle.await.unwrap().unwrap();
    }
}
