//! Price ledger endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

use super::LedgerErrorResponse;
use crate::models::SetPrice;
use crate::repos::price_repo::PriceInterval;
use crate::services::price_ledger;

#[derive(Debug, Serialize)]
pub struct PriceSetResponse {
    pub price_id: i64,
}

/// Optional instant for the price lookup; absent means now
#[derive(Debug, Deserialize)]
pub struct PriceAtQuery {
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CurrentPriceResponse {
    pub variant_id: i64,
    pub price: Decimal,
}

/// Handler for POST /api/inventory/prices
pub async fn set_price(
    State(pool): State<Arc<PgPool>>,
    payload: Result<Json<SetPrice>, JsonRejection>,
) -> Result<(StatusCode, Json<PriceSetResponse>), LedgerErrorResponse> {
    let Json(body) = payload?;
    let price_id = price_ledger::set_price(&pool, &body).await?;
    Ok((StatusCode::CREATED, Json(PriceSetResponse { price_id })))
}

/// Handler for GET /api/inventory/variants/{id}/price
pub async fn get_current_price(
    State(pool): State<Arc<PgPool>>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<PriceAtQuery>, QueryRejection>,
) -> Result<Json<CurrentPriceResponse>, LedgerErrorResponse> {
    let Path(variant_id) = path?;
    let Query(params) = query?;

    let price = match params.at {
        Some(at) => price_ledger::price_at(&pool, variant_id, at).await?,
        None => price_ledger::current_price(&pool, variant_id).await?,
    };
    Ok(Json(CurrentPriceResponse { variant_id, price }))
}

/// Handler for GET /api/inventory/variants/{id}/prices
pub async fn get_price_history(
    State(pool): State<Arc<PgPool>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<PriceInterval>>, LedgerErrorResponse> {
    let Path(variant_id) = path?;
    let history = price_ledger::price_history(&pool, variant_id).await?;
    Ok(Json(history))
}
