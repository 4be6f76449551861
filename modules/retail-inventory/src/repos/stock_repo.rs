//! Repository for stock lines (`products_in_storage`)
//!
//! One row per (variant, storage) pair, backed by a unique constraint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Postgres, Transaction};

/// Stock line joined with its variant and product
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StockLine {
    pub id: i64,
    pub variant_id: i64,
    pub storage_id: i64,
    pub quantity: i32,
    pub moved_at: DateTime<Utc>,
    pub product_id: i64,
    pub product_name: String,
    pub weight: i32,
    pub unit: String,
}

/// Stock line together with the storage holding it
#[derive(Debug, Clone, FromRow)]
pub struct StorageStockLine {
    pub storage_name: String,
    #[sqlx(flatten)]
    pub line: StockLine,
}

pub async fn find_line_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    storage_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM products_in_storage
        WHERE variant_id = $1 AND storage_id = $2
        "#,
    )
    .bind(variant_id)
    .bind(storage_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Overwrite the quantity of an existing line
pub async fn update_quantity_tx(
    tx: &mut Transaction<'_, Postgres>,
    line_id: i64,
    quantity: i32,
    moved_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE products_in_storage
        SET quantity = $2, added_at = $3
        WHERE id = $1
        "#,
    )
    .bind(line_id)
    .bind(quantity)
    .bind(moved_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn insert_line_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    storage_id: i64,
    quantity: i32,
    moved_at: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO products_in_storage (variant_id, storage_id, added_at, quantity)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(variant_id)
    .bind(storage_id)
    .bind(moved_at)
    .bind(quantity)
    .fetch_one(&mut **tx)
    .await
}

/// All lines held in one storage
pub async fn lines_for_storage_tx(
    tx: &mut Transaction<'_, Postgres>,
    storage_id: i64,
) -> Result<Vec<StockLine>, sqlx::Error> {
    sqlx::query_as::<_, StockLine>(
        r#"
        SELECT pis.id, pis.variant_id, pis.storage_id, pis.quantity, pis.added_at AS moved_at,
               p.id AS product_id, p.name AS product_name, pv.weight, pv.unit
        FROM products_in_storage pis
        INNER JOIN product_variants pv ON pv.id = pis.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE pis.storage_id = $1
        ORDER BY pis.variant_id
        "#,
    )
    .bind(storage_id)
    .fetch_all(&mut **tx)
    .await
}

/// Lines of one product across all storages, joined through variant → product
pub async fn lines_for_product_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
) -> Result<Vec<StorageStockLine>, sqlx::Error> {
    sqlx::query_as::<_, StorageStockLine>(
        r#"
        SELECT s.name AS storage_name,
               pis.id, pis.variant_id, pis.storage_id, pis.quantity, pis.added_at AS moved_at,
               p.id AS product_id, p.name AS product_name, pv.weight, pv.unit
        FROM storages s
        INNER JOIN products_in_storage pis ON pis.storage_id = s.id
        INNER JOIN product_variants pv ON pv.id = pis.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE p.id = $1
        ORDER BY s.id, pis.variant_id
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut **tx)
    .await
}

/// Ids of the storages holding a variant
pub async fn storage_ids_for_variant_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT storage_id
        FROM products_in_storage
        WHERE variant_id = $1
        ORDER BY storage_id
        "#,
    )
    .bind(variant_id)
    .fetch_all(&mut **tx)
    .await
}

pub async fn find_line_tx(
    tx: &mut Transaction<'_, Postgres>,
    line_id: i64,
) -> Result<Option<StockLine>, sqlx::Error> {
    sqlx::query_as::<_, StockLine>(
        r#"
        SELECT pis.id, pis.variant_id, pis.storage_id, pis.quantity, pis.added_at AS moved_at,
               p.id AS product_id, p.name AS product_name, pv.weight, pv.unit
        FROM products_in_storage pis
        INNER JOIN product_variants pv ON pv.id = pis.variant_id
        INNER JOIN products p ON p.id = pv.product_id
        WHERE pis.id = $1
        "#,
    )
    .bind(line_id)
    .fetch_optional(&mut **tx)
    .await
}
