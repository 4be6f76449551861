//! Stock reconciler
//!
//! Keeps one stock line per (variant, storage). A movement for a pair that
//! already has a line overwrites its quantity (last write wins, never a
//! sum); the first movement for a pair creates the line.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{LedgerError, LedgerResult};
use crate::models::StockMovement;
use crate::repos::stock_repo::{self, StockLine, StorageStockLine};
use crate::repos::{product_repo, storage_repo};
use crate::uow::UnitOfWork;
use crate::validation::{validate_id, validate_stock_movement};

/// Set or create the stock line for a movement; returns the line id
pub async fn upsert_stock_tx(
    tx: &mut Transaction<'_, Postgres>,
    cmd: &StockMovement,
    moved_at: DateTime<Utc>,
) -> LedgerResult<i64> {
    if !product_repo::variant_exists_tx(tx, cmd.variant_id).await? {
        return Err(LedgerError::not_found(format!(
            "variant {} does not exist",
            cmd.variant_id
        )));
    }
    if !storage_repo::exists_tx(tx, cmd.storage_id).await? {
        return Err(LedgerError::not_found(format!(
            "storage {} does not exist",
            cmd.storage_id
        )));
    }

    let line_id = match stock_repo::find_line_id_tx(tx, cmd.variant_id, cmd.storage_id).await? {
        Some(line_id) => {
            stock_repo::update_quantity_tx(tx, line_id, cmd.quantity, moved_at).await?;
            tracing::info!(
                line_id,
                variant_id = cmd.variant_id,
                storage_id = cmd.storage_id,
                quantity = cmd.quantity,
                "Stock line updated"
            );
            line_id
        }
        None => {
            let line_id = stock_repo::insert_line_tx(
                tx,
                cmd.variant_id,
                cmd.storage_id,
                cmd.quantity,
                moved_at,
            )
            .await
            .map_err(|err| match &err {
                // a concurrent writer created the line after our lookup
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    LedgerError::Conflict(format!(
                        "stock line for variant {} in storage {} already exists",
                        cmd.variant_id, cmd.storage_id
                    ))
                }
                _ => LedgerError::from(err),
            })?;
            tracing::info!(
                line_id,
                variant_id = cmd.variant_id,
                storage_id = cmd.storage_id,
                quantity = cmd.quantity,
                "Stock line created"
            );
            line_id
        }
    };

    Ok(line_id)
}

pub async fn stock_lines_for_storage_tx(
    tx: &mut Transaction<'_, Postgres>,
    storage_id: i64,
) -> LedgerResult<Vec<StockLine>> {
    Ok(stock_repo::lines_for_storage_tx(tx, storage_id).await?)
}

/// (storage, stock line) pairs for every variant of a product
pub async fn stock_lines_for_product_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
) -> LedgerResult<Vec<StorageStockLine>> {
    Ok(stock_repo::lines_for_product_tx(tx, product_id).await?)
}

/// Storages currently holding a variant; empty when it is stocked nowhere
pub async fn storage_ids_for_variant_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
) -> LedgerResult<Vec<i64>> {
    Ok(stock_repo::storage_ids_for_variant_tx(tx, variant_id).await?)
}

/// Apply a stock movement in its own unit of work
pub async fn upsert_stock(pool: &PgPool, cmd: &StockMovement) -> LedgerResult<i64> {
    let moved_at = validate_stock_movement(cmd)?;

    let mut uow = UnitOfWork::begin(pool, "upsert_stock").await?;
    let result = upsert_stock_tx(uow.tx(), cmd, moved_at).await;
    uow.finish(result).await
}

/// Read one stock line by id
pub async fn find_stock_line(pool: &PgPool, line_id: i64) -> LedgerResult<StockLine> {
    validate_id("stock_line_id", line_id)?;

    let mut uow = UnitOfWork::begin_read_only(pool, "find_stock_line").await?;
    let result = stock_repo::find_line_tx(uow.tx(), line_id)
        .await
        .map_err(LedgerError::from)
        .and_then(|line| {
            line.ok_or_else(|| LedgerError::not_found(format!("stock line {} not found", line_id)))
        });
    uow.finish(result).await
}
