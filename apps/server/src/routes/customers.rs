//! Customer routes (plain JSON, no media upload flow).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use bodega_core::validation::{validate_name, validate_required};
use bodega_core::{Customer, CustomerPatch, NewCustomer};
use bodega_db::CustomerFilter;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route("/customers/deleted", get(list_deleted))
        .route(
            "/customers/:id",
            get(get_one).put(update).delete(soft_delete),
        )
}

/// POST /customers
async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    validate_name(&new.name).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_required("city", &new.city).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_required("channel", &new.channel).map_err(|e| ApiError::validation(e.to_string()))?;

    let customer = state.db.customers().insert(&new).await?;
    info!(id = %customer.id, name = %customer.name, "Customer created");

    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /customers?city=&channel=
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.db.customers().list(&filter).await?))
}

/// GET /customers/deleted
async fn list_deleted(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.db.customers().list_deleted().await?))
}

/// GET /customers/{id}
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &id))?;

    Ok(Json(customer))
}

/// PUT /customers/{id} — only provided fields change
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<Customer>, ApiError> {
    if let Some(name) = &patch.name {
        validate_name(name).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let customer = state.db.customers().update(&id, &patch).await?;

    Ok(Json(customer))
}

/// DELETE /customers/{id} — soft delete
async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db.customers().soft_delete(&id).await?;
    info!(id = %id, "Customer soft-deleted");

    Ok(Json(json!({ "message": "Customer deleted" })))
}
