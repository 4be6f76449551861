//! Catalog commands: add products and variants, remove products
//!
//! A product and its initial variants are written in one unit of work, so a
//! failing variant leaves no orphan product behind.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{AddedProduct, NewProduct, NewVariant};
use crate::repos::product_repo;
use crate::uow::UnitOfWork;
use crate::validation::{validate_id, validate_new_product, validate_new_variant};

/// Insert a product header followed by each of its variants
pub async fn add_product_tx(
    tx: &mut Transaction<'_, Postgres>,
    product: &NewProduct,
    added_at: DateTime<Utc>,
) -> LedgerResult<AddedProduct> {
    let product_id = product_repo::insert_product_tx(tx, product, added_at).await?;

    let mut variant_ids = Vec::with_capacity(product.variants.len());
    for variant in &product.variants {
        let variant_id = product_repo::insert_variant_tx(tx, product_id, variant, added_at).await?;
        variant_ids.push(variant_id);
    }

    tracing::info!(
        product_id,
        variants = variant_ids.len(),
        "Product added"
    );

    Ok(AddedProduct {
        product_id,
        variant_ids,
    })
}

pub async fn add_product(pool: &PgPool, product: &NewProduct) -> LedgerResult<AddedProduct> {
    validate_new_product(product)?;

    let mut uow = UnitOfWork::begin(pool, "add_product").await?;
    let result = add_product_tx(uow.tx(), product, Utc::now()).await;
    uow.finish(result).await
}

/// Attach a new variant to an existing, non-removed product
pub async fn add_variant(
    pool: &PgPool,
    product_id: i64,
    variant: &NewVariant,
) -> LedgerResult<i64> {
    validate_id("product_id", product_id)?;
    validate_new_variant(variant, 0)?;

    let mut uow = UnitOfWork::begin(pool, "add_variant").await?;
    let result = add_variant_tx(uow.tx(), product_id, variant, Utc::now()).await;
    uow.finish(result).await
}

async fn add_variant_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    variant: &NewVariant,
    added_at: DateTime<Utc>,
) -> LedgerResult<i64> {
    if product_repo::find_active_by_id_tx(tx, product_id)
        .await?
        .is_none()
    {
        return Err(LedgerError::not_found(format!(
            "product {} not found",
            product_id
        )));
    }

    let variant_id = product_repo::insert_variant_tx(tx, product_id, variant, added_at).await?;

    tracing::info!(product_id, variant_id, "Variant added");

    Ok(variant_id)
}

/// Logically remove a product
///
/// The row and its history stay; the product just disappears from listings.
pub async fn remove_product(pool: &PgPool, product_id: i64) -> LedgerResult<()> {
    validate_id("product_id", product_id)?;

    let mut uow = UnitOfWork::begin(pool, "remove_product").await?;
    let result = remove_product_tx(uow.tx(), product_id, Utc::now()).await;
    uow.finish(result).await
}

async fn remove_product_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    removed_at: DateTime<Utc>,
) -> LedgerResult<()> {
    if !product_repo::mark_removed_tx(tx, product_id, removed_at).await? {
        return Err(LedgerError::not_found(format!(
            "product {} not found",
            product_id
        )));
    }

    tracing::info!(product_id, "Product removed");
    Ok(())
}
