//! Inventory ledger HTTP API
//!
//! Handlers only decode requests, call one service boundary function and
//! map the outcome; transactions are owned by the services.

pub mod prices;
pub mod products;
pub mod sales;
pub mod stock;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::LedgerError;
use crate::health::health;

/// Router for the whole service, health endpoint included
pub fn inventory_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Catalog
        .route(
            "/api/inventory/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/api/inventory/products/{id}",
            get(products::get_product).delete(products::remove_product),
        )
        .route(
            "/api/inventory/products/{id}/variants",
            post(products::create_variant),
        )
        // Prices
        .route("/api/inventory/prices", post(prices::set_price))
        .route(
            "/api/inventory/variants/{id}/price",
            get(prices::get_current_price),
        )
        .route(
            "/api/inventory/variants/{id}/prices",
            get(prices::get_price_history),
        )
        // Stock
        .route(
            "/api/inventory/stock",
            post(stock::upsert_stock).get(stock::list_stock),
        )
        .route("/api/inventory/stock/{id}", get(stock::get_stock_line))
        // Sales
        .route(
            "/api/inventory/sales",
            post(sales::record_sale).get(sales::list_sales),
        )
        .with_state(Arc::new(pool))
}

/// Error body returned by every inventory endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Error response wrapper mapping ledger errors onto HTTP statuses
#[derive(Debug)]
pub struct LedgerErrorResponse {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl From<LedgerError> for LedgerErrorResponse {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // driver details stay in the logs
        let message = match &err {
            LedgerError::Database(_) => "internal database error".to_string(),
            _ => err.to_string(),
        };

        Self {
            status,
            kind: err.kind(),
            message,
        }
    }
}

impl LedgerErrorResponse {
    /// Undecodable path, query or body; keeps the extractor's status
    fn rejected(status: StatusCode, message: String) -> Self {
        Self {
            status,
            kind: "invalid_argument",
            message,
        }
    }
}

impl From<JsonRejection> for LedgerErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for LedgerErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for LedgerErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for LedgerErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LedgerError::invalid("bad"), StatusCode::BAD_REQUEST),
            (LedgerError::not_found("gone"), StatusCode::NOT_FOUND),
            (LedgerError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                LedgerError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(LedgerErrorResponse::from(err).status, status);
        }
    }

    #[test]
    fn test_database_error_message_is_generic() {
        let resp = LedgerErrorResponse::from(LedgerError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(resp.kind, "internal");
        assert_eq!(resp.message, "internal database error");
    }

    #[test]
    fn test_caller_error_message_is_kept() {
        let resp = LedgerErrorResponse::from(LedgerError::not_found("no price for variant 99"));
        assert_eq!(resp.kind, "not_found");
        assert_eq!(resp.message, "Not found: no price for variant 99");
    }
}
