//! Repository for sales
//!
//! Sales are append-only: there is no update or delete here. Listing
//! queries are one fixed statement per filter combination.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, Postgres, Transaction};

/// Sale joined with the product name of its variant
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SaleRecord {
    pub id: i64,
    pub variant_id: i64,
    pub storage_id: i64,
    pub product_name: String,
    pub sold_at: DateTime<Utc>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Values for a new sale row
#[derive(Debug, Clone)]
pub struct SaleInsert {
    pub variant_id: i64,
    pub storage_id: i64,
    pub sold_at: DateTime<Utc>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

pub async fn insert_sale_tx(
    tx: &mut Transaction<'_, Postgres>,
    sale: &SaleInsert,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO sales (variant_id, storage_id, sold_at, quantity, unit_price, total_price)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(sale.variant_id)
    .bind(sale.storage_id)
    .bind(sale.sold_at)
    .bind(sale.quantity)
    .bind(sale.unit_price)
    .bind(sale.total_price)
    .fetch_one(&mut **tx)
    .await
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    sale_id: i64,
) -> Result<Option<SaleRecord>, sqlx::Error> {
    sqlx::query_as::<_, SaleRecord>(
        r#"
        SELECT s.id, s.variant_id, s.storage_id, p.name AS product_name,
               s.sold_at, s.quantity, s.unit_price, s.total_price
        FROM sales s
        INNER JOIN product_variants pv ON pv.id = s.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE s.id = $1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Sales in `[start, end]` with no other predicate
pub async fn list_by_date_range_tx(
    tx: &mut Transaction<'_, Postgres>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<SaleRecord>, sqlx::Error> {
    sqlx::query_as::<_, SaleRecord>(
        r#"
        SELECT s.id, s.variant_id, s.storage_id, p.name AS product_name,
               s.sold_at, s.quantity, s.unit_price, s.total_price
        FROM sales s
        INNER JOIN product_variants pv ON pv.id = s.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE s.sold_at >= $1 AND s.sold_at <= $2
        ORDER BY s.sold_at, s.id
        LIMIT $3
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}

pub async fn list_by_storage_tx(
    tx: &mut Transaction<'_, Postgres>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    storage_id: i64,
    limit: i64,
) -> Result<Vec<SaleRecord>, sqlx::Error> {
    sqlx::query_as::<_, SaleRecord>(
        r#"
        SELECT s.id, s.variant_id, s.storage_id, p.name AS product_name,
               s.sold_at, s.quantity, s.unit_price, s.total_price
        FROM sales s
        INNER JOIN product_variants pv ON pv.id = s.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE s.sold_at >= $1 AND s.sold_at <= $2
          AND s.storage_id = $3
        ORDER BY s.sold_at, s.id
        LIMIT $4
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(storage_id)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}

pub async fn list_by_product_name_tx(
    tx: &mut Transaction<'_, Postgres>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    product_name: &str,
    limit: i64,
) -> Result<Vec<SaleRecord>, sqlx::Error> {
    sqlx::query_as::<_, SaleRecord>(
        r#"
        SELECT s.id, s.variant_id, s.storage_id, p.name AS product_name,
               s.sold_at, s.quantity, s.unit_price, s.total_price
        FROM sales s
        INNER JOIN product_variants pv ON pv.id = s.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE s.sold_at >= $1 AND s.sold_at <= $2
          AND p.name = $3
        ORDER BY s.sold_at, s.id
        LIMIT $4
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(product_name)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}

pub async fn list_by_storage_and_product_name_tx(
    tx: &mut Transaction<'_, Postgres>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    storage_id: i64,
    product_name: &str,
    limit: i64,
) -> Result<Vec<SaleRecord>, sqlx::Error> {
    sqlx::query_as::<_, SaleRecord>(
        r#"
        SELECT s.id, s.variant_id, s.storage_id, p.name AS product_name,
               s.sold_at, s.quantity, s.unit_price, s.total_price
        FROM sales s
        INNER JOIN product_variants pv ON pv.id = s.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE s.sold_at >= $1 AND s.sold_at <= $2
          AND s.storage_id = $3
          AND p.name = $4
        ORDER BY s.sold_at, s.id
        LIMIT $5
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(storage_id)
    .bind(product_name)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}
