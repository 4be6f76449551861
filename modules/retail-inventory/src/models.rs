//! Commands accepted by the ledger and the views it returns

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product to add to the catalog, with its initial variants
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
}

/// Weight/unit variant of a product (e.g. 1000 ml)
#[derive(Debug, Clone, Deserialize)]
pub struct NewVariant {
    pub weight: i32,
    pub unit: String,
}

/// Identifiers assigned when a product is added
#[derive(Debug, Clone, Serialize)]
pub struct AddedProduct {
    pub product_id: i64,
    pub variant_ids: Vec<i64>,
}

/// Price to set for a variant over `[start_date, end_date)`
///
/// `start_date` is optional at the wire level so that a missing value is
/// reported as an invalid argument rather than a decoding failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPrice {
    pub variant_id: i64,
    pub price: Decimal,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Stock movement: set the quantity of a variant held in a storage
#[derive(Debug, Clone, Deserialize)]
pub struct StockMovement {
    pub variant_id: i64,
    pub storage_id: i64,
    pub quantity: i32,
    pub moved_at: Option<DateTime<Utc>>,
}

/// Sale to record; `sold_at` defaults to now
#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub variant_id: i64,
    pub storage_id: i64,
    pub quantity: i32,
    pub sold_at: Option<DateTime<Utc>>,
}

/// Result of recording a sale, including the price snapshot it used
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub sale_id: i64,
    pub sold_at: DateTime<Utc>,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Product listing filters; empty strings count as absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub tag: Option<String>,
    pub name: Option<String>,
    pub limit: Option<i64>,
}

/// Sale listing filters
///
/// The date range is mandatory and inclusive on both ends.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleFilter {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub limit: Option<i64>,
    pub storage_id: Option<i64>,
    pub product_name: Option<String>,
}

/// Product with its variants, each enriched with price and storage locations
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub added_at: DateTime<Utc>,
    pub variants: Vec<VariantDetail>,
}

/// Variant view; `current_price` is `None` and `in_storages` empty when unknown
#[derive(Debug, Clone, Serialize)]
pub struct VariantDetail {
    pub id: i64,
    pub product_id: i64,
    pub weight: i32,
    pub unit: String,
    pub added_at: DateTime<Utc>,
    pub current_price: Option<Decimal>,
    pub in_storages: Vec<i64>,
}

/// Storage with the stock lines it holds
#[derive(Debug, Clone, Serialize)]
pub struct StorageWithStock {
    pub storage_id: i64,
    pub name: String,
    pub lines: Vec<crate::repos::stock_repo::StockLine>,
}

/// Default result limit for product and sale listings
pub const DEFAULT_LIST_LIMIT: i64 = 3;
