//! Product routes.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use bodega_core::validation::{validate_name, validate_price_cents, validate_quantity, validate_stock};
use bodega_core::{NewProduct, Product, ProductDetail, ProductListing, ProductPatch};
use bodega_db::ProductFilter;

use crate::error::ApiError;
use crate::routes::{store_image, FormData};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/deleted", get(list_deleted))
        .route("/products/:id", get(get_one).put(update).delete(soft_delete))
        .route("/products/:id/category", get(get_with_category))
        .route("/products/:id/deactivate", patch(deactivate))
        .route("/products/:id/subtract-stock", patch(subtract_stock))
}

/// POST /products — multipart form: name, price_cents, category_id,
/// description?, stock?, active?, image?
async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let form = FormData::read(multipart).await?;

    let name = form.required("name")?;
    validate_name(&name).map_err(|e| ApiError::validation(e.to_string()))?;

    let price_cents = form
        .integer("price_cents")?
        .ok_or_else(|| ApiError::validation("price_cents is required"))?;
    validate_price_cents(price_cents).map_err(|e| ApiError::validation(e.to_string()))?;

    let stock = form.integer("stock")?.unwrap_or(0);
    validate_stock(stock).map_err(|e| ApiError::validation(e.to_string()))?;

    let media_url = store_image(&state, &form).await?;

    let new = NewProduct {
        name,
        description: form.text("description"),
        price_cents,
        stock,
        active: form.boolean("active")?.unwrap_or(true),
        category_id: form.required("category_id")?,
        media_url,
    };

    let product = state.db.products().insert(&new).await?;
    info!(id = %product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products?category_id=&active=
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductListing>>, ApiError> {
    Ok(Json(state.db.products().list(&filter).await?))
}

/// GET /products/deleted
async fn list_deleted(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.products().list_deleted().await?))
}

/// GET /products/{id}
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(Json(product))
}

/// GET /products/{id}/category
async fn get_with_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let detail = state
        .db
        .products()
        .get_with_category(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(Json(detail))
}

/// PUT /products/{id} — multipart form, only provided fields change
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let form = FormData::read(multipart).await?;

    let name = form.text("name");
    if let Some(name) = &name {
        validate_name(name).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let price_cents = form.integer("price_cents")?;
    if let Some(price_cents) = price_cents {
        validate_price_cents(price_cents).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let stock = form.integer("stock")?;
    if let Some(stock) = stock {
        validate_stock(stock).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let patch = ProductPatch {
        name,
        description: form.text("description"),
        price_cents,
        stock,
        active: form.boolean("active")?,
        category_id: form.text("category_id"),
        media_url: store_image(&state, &form).await?,
    };

    let product = state.db.products().update(&id, &patch).await?;

    Ok(Json(product))
}

/// PATCH /products/{id}/deactivate
async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.db.products().deactivate(&id).await?;
    Ok(Json(product))
}

/// Body of the subtract-stock endpoint.
#[derive(Debug, Deserialize)]
struct SubtractStock {
    quantity: i64,
}

/// PATCH /products/{id}/subtract-stock
///
/// Missing product and insufficient stock collapse into one 400 outcome,
/// mirroring the guarded decrement underneath.
async fn subtract_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SubtractStock>,
) -> Result<Json<Product>, ApiError> {
    validate_quantity(body.quantity).map_err(|e| ApiError::validation(e.to_string()))?;

    let product = state
        .db
        .products()
        .subtract_stock(&id, body.quantity)
        .await?
        .ok_or_else(|| ApiError::validation("Product not found or insufficient stock"))?;

    Ok(Json(product))
}

/// DELETE /products/{id} — soft delete
async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db.products().soft_delete(&id).await?;
    info!(id = %id, "Product soft-deleted");

    Ok(Json(json!({ "message": "Product deleted" })))
}
