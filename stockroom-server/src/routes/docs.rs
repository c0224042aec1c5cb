//! OpenAPI document for the items API.
//!
//! Served as a plain JSON value and kept in lockstep with the routes by
//! hand; the surface is small enough that a generator would outweigh it.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi))
}

/// GET /api-docs/openapi.json
async fn openapi() -> Json<Value> {
    Json(document())
}

fn document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Stockroom Items API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "A small CRUD API for managing items backed by PostgreSQL",
        },
        "paths": {
            "/health": {
                "get": {
                    "summary": "Liveness check",
                    "responses": {
                        "200": { "description": "Service is up" }
                    }
                }
            },
            "/api/v1/items": {
                "get": {
                    "summary": "List items, newest first",
                    "tags": ["Items"],
                    "responses": {
                        "200": {
                            "description": "All items",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Item" }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Create a new item",
                    "tags": ["Items"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/ItemInput" }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "The created item",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Item" }
                                }
                            }
                        },
                        "400": {
                            "description": "Validation failure",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Error" }
                                }
                            }
                        }
                    }
                }
            },
            "/api/v1/items/{id}": {
                "parameters": [{
                    "name": "id",
                    "in": "path",
                    "required": true,
                    "schema": { "type": "integer" }
                }],
                "get": {
                    "summary": "Fetch a single item",
                    "tags": ["Items"],
                    "responses": {
                        "200": {
                            "description": "The item",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Item" }
                                }
                            }
                        },
                        "404": {
                            "description": "No such item",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Error" }
                                }
                            }
                        }
                    }
                },
                "put": {
                    "summary": "Replace an item",
                    "tags": ["Items"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/ItemInput" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "The updated item",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Item" }
                                }
                            }
                        },
                        "400": { "description": "Validation failure" },
                        "404": { "description": "No such item" }
                    }
                },
                "delete": {
                    "summary": "Delete an item",
                    "tags": ["Items"],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "404": { "description": "No such item" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Item": {
                    "type": "object",
                    "required": ["id", "name"],
                    "properties": {
                        "id": { "type": "integer", "description": "Item ID" },
                        "name": { "type": "string", "description": "Item name" },
                        "description": { "type": "string", "nullable": true },
                        "created_at": { "type": "string", "format": "date-time" },
                        "updated_at": { "type": "string", "format": "date-time" },
                        "smoker": { "type": "string", "nullable": true },
                        "longitude": { "type": "number", "nullable": true },
                        "latitude": { "type": "number", "nullable": true }
                    }
                },
                "ItemInput": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string", "nullable": true },
                        "smoker": { "type": "string", "nullable": true },
                        "longitude": { "type": "number", "nullable": true },
                        "latitude": { "type": "number", "nullable": true }
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string" },
                        "message": { "type": "string" }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use stockroom_core::{ConnectionConfig, Database, Profile};

    use super::*;
    use crate::state::AppState;

    fn app(expose_docs: bool) -> axum::Router {
        let state = AppState::new(
            Database::new(ConnectionConfig::from_env(Profile::Server)),
            expose_docs,
        );
        crate::build_router(state)
    }

    #[test]
    fn document_covers_the_items_surface() {
        let doc = document();
        assert!(doc["paths"]["/api/v1/items"]["post"].is_object());
        assert!(doc["paths"]["/api/v1/items/{id}"]["delete"].is_object());
        assert_eq!(
            doc["components"]["schemas"]["ItemInput"]["required"][0],
            "name"
        );
    }

    #[tokio::test]
    async fn docs_served_when_exposed() {
        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app(true).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn docs_absent_when_disabled() {
        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
