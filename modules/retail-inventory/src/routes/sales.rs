//! Sales endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::LedgerErrorResponse;
use crate::models::{NewSale, SaleFilter, SaleReceipt};
use crate::repos::sale_repo::SaleRecord;
use crate::services::{catalog_query, sale_recorder};

/// Handler for POST /api/inventory/sales
pub async fn record_sale(
    State(pool): State<Arc<PgPool>>,
    payload: Result<Json<NewSale>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleReceipt>), LedgerErrorResponse> {
    let Json(body) = payload?;
    let receipt = sale_recorder::record_sale(&pool, &body).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Handler for GET /api/inventory/sales
///
/// `start_date` and `end_date` are required RFC 3339 instants, both inclusive.
pub async fn list_sales(
    State(pool): State<Arc<PgPool>>,
    query: Result<Query<SaleFilter>, QueryRejection>,
) -> Result<Json<Vec<SaleRecord>>, LedgerErrorResponse> {
    let Query(params) = query?;
    let sales = catalog_query::find_sales(&pool, &params).await?;
    Ok(Json(sales))
}
