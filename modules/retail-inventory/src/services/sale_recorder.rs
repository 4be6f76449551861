//! Sale recorder
//!
//! Appends an immutable sale stamped with the price effective at `sold_at`.
//! Recording a sale does not touch stock quantities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewSale, SaleReceipt};
use crate::repos::sale_repo::{self, SaleInsert, SaleRecord};
use crate::repos::storage_repo;
use crate::services::price_ledger;
use crate::uow::UnitOfWork;
use crate::validation::{validate_id, validate_new_sale};

/// Total price of a sale line
///
/// A total beyond the decimal range is rejected as `InvalidArgument`.
pub fn compute_total(unit_price: Decimal, quantity: i32) -> LedgerResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| {
            LedgerError::invalid(format!(
                "total of {} x {} is out of range",
                quantity, unit_price
            ))
        })
}

/// Record a sale inside the caller's transaction
///
/// Fails with `NotFound` if the variant has no price at `sold_at` or the
/// storage does not exist; nothing is written in either case.
pub async fn record_sale_tx(
    tx: &mut Transaction<'_, Postgres>,
    cmd: &NewSale,
    sold_at: DateTime<Utc>,
) -> LedgerResult<SaleReceipt> {
    let unit_price = price_ledger::price_at_tx(tx, cmd.variant_id, sold_at).await?;

    if !storage_repo::exists_tx(tx, cmd.storage_id).await? {
        return Err(LedgerError::not_found(format!(
            "storage {} does not exist",
            cmd.storage_id
        )));
    }

    let total_price = compute_total(unit_price, cmd.quantity)?;

    let sale_id = sale_repo::insert_sale_tx(
        tx,
        &SaleInsert {
            variant_id: cmd.variant_id,
            storage_id: cmd.storage_id,
            sold_at,
            quantity: cmd.quantity,
            unit_price,
            total_price,
        },
    )
    .await?;

    tracing::info!(
        sale_id,
        variant_id = cmd.variant_id,
        storage_id = cmd.storage_id,
        quantity = cmd.quantity,
        total_price = %total_price,
        "Sale recorded"
    );

    Ok(SaleReceipt {
        sale_id,
        sold_at,
        unit_price,
        total_price,
    })
}

/// Record a sale in its own unit of work; `sold_at` defaults to now
pub async fn record_sale(pool: &PgPool, cmd: &NewSale) -> LedgerResult<SaleReceipt> {
    validate_new_sale(cmd)?;
    let sold_at = cmd.sold_at.unwrap_or_else(Utc::now);

    let mut uow = UnitOfWork::begin(pool, "record_sale").await?;
    let result = record_sale_tx(uow.tx(), cmd, sold_at).await;
    uow.finish(result).await
}

/// Read back one recorded sale
pub async fn find_sale(pool: &PgPool, sale_id: i64) -> LedgerResult<SaleRecord> {
    validate_id("sale_id", sale_id)?;

    let mut uow = UnitOfWork::begin_read_only(pool, "find_sale").await?;
    let result = sale_repo::find_by_id_tx(uow.tx(), sale_id)
        .await
        .map_err(LedgerError::from)
        .and_then(|sale| {
            sale.ok_or_else(|| LedgerError::not_found(format!("sale {} not found", sale_id)))
        });
    uow.finish(result).await
}
