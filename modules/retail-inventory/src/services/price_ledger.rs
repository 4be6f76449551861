//! Temporal price ledger
//!
//! Stores one effective price per variant per `[start, end)` interval.
//!
//! Setting a price follows a check-then-branch rule keyed on the exact
//! (variant, start_date) pair:
//! - an interval with that start exists (end matching the caller's end, or
//!   still open) **and** the caller supplies an end date → the existing
//!   interval is closed at "now";
//! - otherwise a new interval is inserted. An open-ended insert first closes
//!   every still-open interval of the variant starting at or before the new
//!   start, ending it exactly at the new start. Scheduling a future price
//!   therefore keeps the current one effective until the switch-over.
//!
//! There is no general range-overlap check: bounded intervals with distinct
//! start dates may overlap, and concurrent writers are serialized only by
//! Postgres.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{LedgerError, LedgerResult};
use crate::models::SetPrice;
use crate::repos::{price_repo, product_repo};
use crate::repos::price_repo::PriceInterval;
use crate::uow::UnitOfWork;
use crate::validation::{validate_id, validate_set_price};

/// Outcome of the existence check for a price command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDecision {
    /// Close the matching interval (set its end to now)
    CloseExisting(i64),
    /// Insert a new interval with the caller's dates
    Insert,
}

/// Branch on the existence check
///
/// Only a caller-supplied end date turns a match into a close.
pub fn decide(existing: Option<i64>, end_date: Option<DateTime<Utc>>) -> PriceDecision {
    match (existing, end_date) {
        (Some(price_id), Some(_)) => PriceDecision::CloseExisting(price_id),
        _ => PriceDecision::Insert,
    }
}

/// Set a price for a variant inside the caller's transaction
///
/// `start_date` is the validated start of `cmd`; `now` stamps any closed interval.
/// Returns the id of the interval that was closed or inserted.
pub async fn set_price_tx(
    tx: &mut Transaction<'_, Postgres>,
    cmd: &SetPrice,
    start_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> LedgerResult<i64> {
    if !product_repo::variant_exists_tx(tx, cmd.variant_id).await? {
        return Err(LedgerError::not_found(format!(
            "variant {} does not exist",
            cmd.variant_id
        )));
    }

    let existing =
        price_repo::find_matching_interval_tx(tx, cmd.variant_id, start_date, cmd.end_date)
            .await?;

    match decide(existing, cmd.end_date) {
        PriceDecision::CloseExisting(price_id) => {
            price_repo::close_interval_tx(tx, price_id, now).await?;

            tracing::info!(
                variant_id = cmd.variant_id,
                price_id,
                closed_at = %now,
                "Price interval closed"
            );

            Ok(price_id)
        }
        PriceDecision::Insert => {
            if cmd.end_date.is_none() {
                let superseded =
                    price_repo::close_open_intervals_tx(tx, cmd.variant_id, start_date).await?;
                if superseded > 0 {
                    tracing::info!(
                        variant_id = cmd.variant_id,
                        superseded,
                        superseded_from = %start_date,
                        "Open price intervals superseded"
                    );
                }
            }

            let price_id = price_repo::insert_interval_tx(
                tx,
                cmd.variant_id,
                cmd.price,
                start_date,
                cmd.end_date,
            )
            .await?;

            tracing::info!(
                variant_id = cmd.variant_id,
                price_id,
                price = %cmd.price,
                start_date = %start_date,
                "Price interval inserted"
            );

            Ok(price_id)
        }
    }
}

/// Price effective for a variant at `at`
///
/// Fails with `NotFound` when no interval contains `at`.
pub async fn price_at_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    at: DateTime<Utc>,
) -> LedgerResult<Decimal> {
    price_repo::find_price_at_tx(tx, variant_id, at)
        .await?
        .ok_or_else(|| LedgerError::not_found(format!("no price for variant {}", variant_id)))
}

/// Price effective for a variant right now
pub async fn current_price_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
) -> LedgerResult<Decimal> {
    price_at_tx(tx, variant_id, Utc::now()).await
}

/// Set a price in its own unit of work
pub async fn set_price(pool: &PgPool, cmd: &SetPrice) -> LedgerResult<i64> {
    let start_date = validate_set_price(cmd)?;

    let mut uow = UnitOfWork::begin(pool, "set_price").await?;
    let result = set_price_tx(uow.tx(), cmd, start_date, Utc::now()).await;
    uow.finish(result).await
}

/// Current price of a variant
pub async fn current_price(pool: &PgPool, variant_id: i64) -> LedgerResult<Decimal> {
    validate_id("variant_id", variant_id)?;

    let mut uow = UnitOfWork::begin_read_only(pool, "current_price").await?;
    let result = current_price_tx(uow.tx(), variant_id).await;
    uow.finish(result).await
}

/// Price of a variant effective at an arbitrary instant
pub async fn price_at(pool: &PgPool, variant_id: i64, at: DateTime<Utc>) -> LedgerResult<Decimal> {
    validate_id("variant_id", variant_id)?;

    let mut uow = UnitOfWork::begin_read_only(pool, "price_at").await?;
    let result = price_at_tx(uow.tx(), variant_id, at).await;
    uow.finish(result).await
}

/// Price intervals of a variant in start order
pub async fn price_history(pool: &PgPool, variant_id: i64) -> LedgerResult<Vec<PriceInterval>> {
    validate_id("variant_id", variant_id)?;

    let mut uow = UnitOfWork::begin_read_only(pool, "price_history").await?;
    let result = price_history_tx(uow.tx(), variant_id).await;
    uow.finish(result).await
}

async fn price_history_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
) -> LedgerResult<Vec<PriceInterval>> {
    if !product_repo::variant_exists_tx(tx, variant_id).await? {
        return Err(LedgerError::not_found(format!(
            "variant {} does not exist",
            variant_id
        )));
    }

    Ok(price_repo::list_for_variant_tx(tx, variant_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_match_with_end_date_closes() {
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(decide(Some(42), Some(end)), PriceDecision::CloseExisting(42));
    }

    #[test]
    fn test_match_without_end_date_inserts() {
        assert_eq!(decide(Some(42), None), PriceDecision::Insert);
    }

    #[test]
    fn test_no_match_inserts() {
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(decide(None, Some(end)), PriceDecision::Insert);
        assert_eq!(decide(None, None), PriceDecision::Insert);
    }
}
