//! Category routes.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use bodega_core::validation::validate_name;
use bodega_core::{Category, CategoryPatch, CategoryWithProducts, NewCategory};

use crate::error::ApiError;
use crate::routes::{store_image, FormData};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/deleted", get(list_deleted))
        .route(
            "/categories/:id",
            get(get_one).put(update).delete(soft_delete),
        )
        .route("/categories/:id/products", get(get_products))
        .route("/categories/:id/deactivate", patch(deactivate))
}

/// POST /categories — multipart form: name, description?, active?, image?
async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let form = FormData::read(multipart).await?;

    let name = form.required("name")?;
    validate_name(&name).map_err(|e| ApiError::validation(e.to_string()))?;

    let media_url = store_image(&state, &form).await?;

    let new = NewCategory {
        name,
        description: form.text("description"),
        active: form.boolean("active")?.unwrap_or(true),
        media_url,
    };

    let category = state.db.categories().insert(&new).await?;
    info!(id = %category.id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /categories
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories().list().await?))
}

/// GET /categories/deleted
async fn list_deleted(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories().list_deleted().await?))
}

/// GET /categories/{id}
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .db
        .categories()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", &id))?;

    Ok(Json(category))
}

/// GET /categories/{id}/products
async fn get_products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryWithProducts>, ApiError> {
    let category = state
        .db
        .categories()
        .get_with_products(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", &id))?;

    Ok(Json(category))
}

/// PUT /categories/{id} — multipart form, only provided fields change
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Category>, ApiError> {
    let form = FormData::read(multipart).await?;

    let name = form.text("name");
    if let Some(name) = &name {
        validate_name(name).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let patch = CategoryPatch {
        name,
        description: form.text("description"),
        active: form.boolean("active")?,
        media_url: store_image(&state, &form).await?,
    };

    let category = state.db.categories().update(&id, &patch).await?;

    Ok(Json(category))
}

/// PATCH /categories/{id}/deactivate
async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let category = state.db.categories().deactivate(&id).await?;
    Ok(Json(category))
}

/// DELETE /categories/{id} — soft delete
async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db.categories().soft_delete(&id).await?;
    info!(id = %id, "Category soft-deleted");

    Ok(Json(json!({ "message": "Category deleted" })))
}
