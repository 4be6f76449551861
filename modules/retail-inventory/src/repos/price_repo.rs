//! Repository for price intervals
//!
//! An interval covers `[start_date, end_date)`; `end_date IS NULL` is open-ended.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, Postgres, Transaction};

/// Price interval row
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PriceInterval {
    pub id: i64,
    pub variant_id: i64,
    pub price: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Find an interval for this exact (variant, start) whose end equals `end_date` or is still open
///
/// This is an exact-key lookup, not a range-overlap check.
pub async fn find_matching_interval_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM product_prices
        WHERE variant_id = $1
          AND start_date = $2
          AND (end_date = $3 OR end_date IS NULL)
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(variant_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(&mut **tx)
    .await
}

/// Set the end of one interval
pub async fn close_interval_tx(
    tx: &mut Transaction<'_, Postgres>,
    price_id: i64,
    end_date: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE product_prices
        SET end_date = $2
        WHERE id = $1
        "#,
    )
    .bind(price_id)
    .bind(end_date)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Close every open interval of a variant starting at or before `superseded_from`
///
/// The end is stamped `max(start_date, superseded_from)`, so the closed
/// interval hands over to the new one without a gap or an overlap.
/// Returns the number of intervals closed.
pub async fn close_open_intervals_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    superseded_from: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE product_prices
        SET end_date = GREATEST(start_date, $2)
        WHERE variant_id = $1
          AND end_date IS NULL
          AND start_date <= $2
        "#,
    )
    .bind(variant_id)
    .bind(superseded_from)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Insert a new interval and return its id
pub async fn insert_interval_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    price: Decimal,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO product_prices (variant_id, price, start_date, end_date)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(variant_id)
    .bind(price)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(&mut **tx)
    .await
}

/// Price effective at `at`: start <= at and (end is null or end > at)
///
/// If permissive writes left overlapping intervals, the latest start wins.
pub async fn find_price_at_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    at: DateTime<Utc>,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT price
        FROM product_prices
        WHERE variant_id = $1
          AND start_date <= $2
          AND (end_date IS NULL OR end_date > $2)
        ORDER BY start_date DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(variant_id)
    .bind(at)
    .fetch_optional(&mut **tx)
    .await
}

/// All intervals of a variant in start order
pub async fn list_for_variant_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
) -> Result<Vec<PriceInterval>, sqlx::Error> {
    sqlx::query_as::<_, PriceInterval>(
        r#"
        SELECT id, variant_id, price, start_date, end_date
        FROM product_prices
        WHERE variant_id = $1
        ORDER BY start_date, id
        "#,
    )
    .bind(variant_id)
    .fetch_all(&mut **tx)
    .await
}
