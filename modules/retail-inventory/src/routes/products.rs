//! Catalog endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use super::LedgerErrorResponse;
use crate::models::{AddedProduct, NewProduct, NewVariant, ProductDetail, ProductQuery};
use crate::services::{catalog_query, catalog_service};

#[derive(Debug, Serialize)]
pub struct VariantCreatedResponse {
    pub product_id: i64,
    pub variant_id: i64,
}

/// Handler for POST /api/inventory/products
pub async fn create_product(
    State(pool): State<Arc<PgPool>>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<AddedProduct>), LedgerErrorResponse> {
    let Json(body) = payload?;
    let added = catalog_service::add_product(&pool, &body).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

/// Handler for GET /api/inventory/products
///
/// Optional `tag` (exact) and `name` (substring) filters, `limit` defaults to 3.
pub async fn list_products(
    State(pool): State<Arc<PgPool>>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductDetail>>, LedgerErrorResponse> {
    let Query(params) = query?;
    let products = catalog_query::find_products(&pool, &params).await?;
    Ok(Json(products))
}

/// Handler for GET /api/inventory/products/{id}
pub async fn get_product(
    State(pool): State<Arc<PgPool>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ProductDetail>, LedgerErrorResponse> {
    let Path(id) = path?;
    let product = catalog_query::find_product_by_id(&pool, id).await?;
    Ok(Json(product))
}

/// Handler for DELETE /api/inventory/products/{id}
pub async fn remove_product(
    State(pool): State<Arc<PgPool>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, LedgerErrorResponse> {
    let Path(id) = path?;
    catalog_service::remove_product(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/inventory/products/{id}/variants
pub async fn create_variant(
    State(pool): State<Arc<PgPool>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NewVariant>, JsonRejection>,
) -> Result<(StatusCode, Json<VariantCreatedResponse>), LedgerErrorResponse> {
    let Path(product_id) = path?;
    let Json(body) = payload?;
    let variant_id = catalog_service::add_variant(&pool, product_id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(VariantCreatedResponse {
            product_id,
            variant_id,
        }),
    ))
}
