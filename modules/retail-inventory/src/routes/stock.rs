//! Stock endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

use super::LedgerErrorResponse;
use crate::models::{StockMovement, StorageWithStock};
use crate::repos::stock_repo::StockLine;
use crate::services::{catalog_query, stock_reconciler};

/// Query parameters for the stock listing; no product id lists every storage
#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub product_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StockLineResponse {
    pub stock_line_id: i64,
}

/// Handler for POST /api/inventory/stock
pub async fn upsert_stock(
    State(pool): State<Arc<PgPool>>,
    payload: Result<Json<StockMovement>, JsonRejection>,
) -> Result<Json<StockLineResponse>, LedgerErrorResponse> {
    let Json(body) = payload?;
    let stock_line_id = stock_reconciler::upsert_stock(&pool, &body).await?;
    Ok(Json(StockLineResponse { stock_line_id }))
}

/// Handler for GET /api/inventory/stock
pub async fn list_stock(
    State(pool): State<Arc<PgPool>>,
    query: Result<Query<StockQuery>, QueryRejection>,
) -> Result<Json<Vec<StorageWithStock>>, LedgerErrorResponse> {
    let Query(params) = query?;
    let storages = catalog_query::find_stock(&pool, params.product_id).await?;
    Ok(Json(storages))
}

/// Handler for GET /api/inventory/stock/{id}
pub async fn get_stock_line(
    State(pool): State<Arc<PgPool>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<StockLine>, LedgerErrorResponse> {
    let Path(line_id) = path?;
    let line = stock_reconciler::find_stock_line(&pool, line_id).await?;
    Ok(Json(line))
}
