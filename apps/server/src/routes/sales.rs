//! Sale routes.
//!
//! `create` is the only interesting one: it hands the whole request to
//! the sale transaction coordinator and maps its outcome — business
//! rejection to 400, storage failure to 500. No sale mutation routes
//! exist; sales are immutable.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use bodega_core::{NewSale, Sale, SaleReceipt};
use bodega_db::SaleFilter;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list).post(create))
        .route("/sales/:id", get(get_one))
}

/// POST /sales
///
/// ```json
/// {
///   "customer_id": "…",
///   "channel": "in-person",
///   "lines": [ { "product_id": "…", "quantity": 2 } ]
/// }
/// ```
///
/// Responds 201 with the eager receipt (customer + lines + product
/// snapshots) exactly as committed.
async fn create(
    State(state): State<AppState>,
    Json(request): Json<NewSale>,
) -> Result<(StatusCode, Json<SaleReceipt>), ApiError> {
    let receipt = state
        .db
        .sales()
        .create_sale(&request.customer_id, request.channel, &request.lines)
        .await?;

    info!(
        sale_id = %receipt.sale.id,
        total_cents = receipt.sale.total_cents,
        lines = receipt.lines.len(),
        "Sale created"
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /sales?customer_id=&channel=
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<SaleFilter>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(state.db.sales().list(&filter).await?))
}

/// GET /sales/{id}
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaleReceipt>, ApiError> {
    let receipt = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    Ok(Json(receipt))
}
