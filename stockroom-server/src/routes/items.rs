//! Item routes - the CRUD surface over the store.
//!
//! Handlers validate first, make sure the schema exists, then go through
//! the core's one-shot query interface; they never hold a pool reference
//! of their own.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::models::{Item, ItemInput, ITEM_COLUMNS};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}

/// GET /items - List items, newest first
async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    state.db().ensure_schema().await?;

    let statement = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id DESC");
    let output = state.db().run_query(&statement, &[]).await?;
    let items = Item::from_rows(&output.rows).map_err(decode_error)?;
    Ok(Json(items))
}

/// GET /items/{id} - Fetch a single item
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Item>, ApiError> {
    state.db().ensure_schema().await?;

    let statement = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
    let output = state.db().run_query(&statement, &[id.into()]).await?;
    let item = Item::first_from_rows(&output.rows)
        .map_err(decode_error)?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// POST /items - Create a new item
async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<ItemInput>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let name = input.validated_name()?.to_owned();

    state.db().ensure_schema().await?;

    let statement = format!(
        "INSERT INTO items (name, description, smoker, longitude, latitude) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {ITEM_COLUMNS}"
    );
    let params = [
        name.into(),
        input.description.clone().into(),
        input.smoker.clone().into(),
        input.longitude.into(),
        input.latitude.into(),
    ];
    let output = state.db().run_query(&statement, &params).await?;
    let item = Item::first_from_rows(&output.rows)
        .map_err(decode_error)?
        .ok_or_else(|| ApiError::Internal {
            message: "insert returned no row".into(),
        })?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /items/{id} - Replace an item
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<ItemInput>,
) -> Result<Json<Item>, ApiError> {
    let name = input.validated_name()?.to_owned();

    state.db().ensure_schema().await?;

    let statement = format!(
        "UPDATE items SET name = $1, description = $2, smoker = $3, longitude = $4, \
         latitude = $5, updated_at = CURRENT_TIMESTAMP WHERE id = $6 RETURNING {ITEM_COLUMNS}"
    );
    let params = [
        name.into(),
        input.description.clone().into(),
        input.smoker.clone().into(),
        input.longitude.into(),
        input.latitude.into(),
        id.into(),
    ];
    let output = state.db().run_query(&statement, &params).await?;
    let item = Item::first_from_rows(&output.rows)
        .map_err(decode_error)?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// DELETE /items/{id} - Delete an item
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.db().ensure_schema().await?;

    let output = state
        .db()
        .run_query("DELETE FROM items WHERE id = $1 RETURNING id", &[id.into()])
        .await?;
    if output.row_count == 0 {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: i32) -> ApiError {
    ApiError::NotFound {
        resource: "item",
        id: id.to_string(),
    }
}

fn decode_error(source: sqlx::Error) -> ApiError {
    ApiError::Internal {
        message: format!("failed to decode item row: {source}"),
    }
}
