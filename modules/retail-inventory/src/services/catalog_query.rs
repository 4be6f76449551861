//! Catalog read projections: products, stock and sales
//!
//! Every listing picks one fixed query from the filters it was given instead
//! of building SQL with optional predicates. Product views are enriched per
//! variant with the current price and the storages holding it; a variant
//! with no price or no stock is still returned, with those fields empty.

use std::collections::BTreeMap;

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    ProductDetail, ProductQuery, SaleFilter, StorageWithStock, VariantDetail, DEFAULT_LIST_LIMIT,
};
use crate::repos::product_repo::{self, ProductRow};
use crate::repos::sale_repo::{self, SaleRecord};
use crate::repos::storage_repo;
use crate::services::{price_ledger, stock_reconciler};
use crate::uow::UnitOfWork;
use crate::validation::{validate_id, validate_sale_filter};

/// Product listing query chosen from the supplied filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFilter<'a> {
    All,
    Tag(&'a str),
    Name(&'a str),
    TagAndName { tag: &'a str, name: &'a str },
}

impl<'a> ProductFilter<'a> {
    /// Blank filter strings are treated as absent
    pub fn from_query(query: &'a ProductQuery) -> Self {
        match (non_blank(&query.tag), non_blank(&query.name)) {
            (None, None) => Self::All,
            (Some(tag), None) => Self::Tag(tag),
            (None, Some(name)) => Self::Name(name),
            (Some(tag), Some(name)) => Self::TagAndName { tag, name },
        }
    }
}

/// Sale listing query chosen from the supplied filters
///
/// Without a storage or product-name filter the plain date-range query runs.
/// A storage id of 0 counts as no storage filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleQueryPlan<'a> {
    DateRange,
    Storage(i64),
    ProductName(&'a str),
    StorageAndProductName { storage_id: i64, product_name: &'a str },
}

impl<'a> SaleQueryPlan<'a> {
    pub fn from_filter(filter: &'a SaleFilter) -> Self {
        let storage_id = filter.storage_id.filter(|id| *id != 0);
        match (storage_id, non_blank(&filter.product_name)) {
            (None, None) => Self::DateRange,
            (Some(storage_id), None) => Self::Storage(storage_id),
            (None, Some(product_name)) => Self::ProductName(product_name),
            (Some(storage_id), Some(product_name)) => Self::StorageAndProductName {
                storage_id,
                product_name,
            },
        }
    }

    pub fn is_filtered(&self) -> bool {
        !matches!(self, Self::DateRange)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Limit to apply to a listing; absent or non-positive falls back to the default
pub fn effective_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(limit) if limit > 0 => limit,
        _ => DEFAULT_LIST_LIMIT,
    }
}

/// Attach variants, current prices and storage locations to a product row
async fn enrich_product_tx(
    tx: &mut Transaction<'_, Postgres>,
    product: ProductRow,
) -> LedgerResult<ProductDetail> {
    let variants = product_repo::variants_for_product_tx(tx, product.id).await?;

    let mut details = Vec::with_capacity(variants.len());
    for variant in variants {
        let current_price = match price_ledger::current_price_tx(tx, variant.id).await {
            Ok(price) => Some(price),
            Err(err) if err.is_not_found() => {
                tracing::debug!(variant_id = variant.id, "Variant has no current price");
                None
            }
            Err(err) => return Err(err),
        };

        let in_storages = stock_reconciler::storage_ids_for_variant_tx(tx, variant.id).await?;

        details.push(VariantDetail {
            id: variant.id,
            product_id: variant.product_id,
            weight: variant.weight,
            unit: variant.unit,
            added_at: variant.added_at,
            current_price,
            in_storages,
        });
    }

    Ok(ProductDetail {
        id: product.id,
        name: product.name,
        description: product.description,
        tags: product.tags,
        added_at: product.added_at,
        variants: details,
    })
}

pub async fn find_products_tx(
    tx: &mut Transaction<'_, Postgres>,
    query: &ProductQuery,
) -> LedgerResult<Vec<ProductDetail>> {
    let limit = effective_limit(query.limit);

    let rows = match ProductFilter::from_query(query) {
        ProductFilter::All => product_repo::list_tx(tx, limit).await?,
        ProductFilter::Tag(tag) => product_repo::list_by_tag_tx(tx, tag, limit).await?,
        ProductFilter::Name(name) => product_repo::list_by_name_tx(tx, name, limit).await?,
        ProductFilter::TagAndName { tag, name } => {
            product_repo::list_by_tag_and_name_tx(tx, tag, name, limit).await?
        }
    };

    let mut products = Vec::with_capacity(rows.len());
    for row in rows {
        products.push(enrich_product_tx(tx, row).await?);
    }

    Ok(products)
}

/// List products matching the optional tag and name filters
pub async fn find_products(pool: &PgPool, query: &ProductQuery) -> LedgerResult<Vec<ProductDetail>> {
    let mut uow = UnitOfWork::begin_read_only(pool, "find_products").await?;
    let result = find_products_tx(uow.tx(), query).await;
    uow.finish(result).await
}

pub async fn find_product_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
) -> LedgerResult<ProductDetail> {
    let row = product_repo::find_active_by_id_tx(tx, product_id)
        .await?
        .ok_or_else(|| LedgerError::not_found(format!("product {} not found", product_id)))?;

    enrich_product_tx(tx, row).await
}

pub async fn find_product_by_id(pool: &PgPool, product_id: i64) -> LedgerResult<ProductDetail> {
    validate_id("product_id", product_id)?;

    let mut uow = UnitOfWork::begin_read_only(pool, "find_product_by_id").await?;
    let result = find_product_by_id_tx(uow.tx(), product_id).await;
    uow.finish(result).await
}

/// Storages with their stock lines
///
/// `None` or `0` lists every storage (including empty ones); a positive id
/// lists only the storages holding a variant of that product.
pub async fn find_stock_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Option<i64>,
) -> LedgerResult<Vec<StorageWithStock>> {
    match product_id {
        None | Some(0) => {
            let storages = storage_repo::list_tx(tx).await?;
            let mut result = Vec::with_capacity(storages.len());
            for storage in storages {
                let lines = stock_reconciler::stock_lines_for_storage_tx(tx, storage.id).await?;
                result.push(StorageWithStock {
                    storage_id: storage.id,
                    name: storage.name,
                    lines,
                });
            }
            Ok(result)
        }
        Some(product_id) => {
            let rows = stock_reconciler::stock_lines_for_product_tx(tx, product_id).await?;

            // rows arrive ordered by storage id
            let mut grouped: BTreeMap<i64, StorageWithStock> = BTreeMap::new();
            for row in rows {
                grouped
                    .entry(row.line.storage_id)
                    .or_insert_with(|| StorageWithStock {
                        storage_id: row.line.storage_id,
                        name: row.storage_name.clone(),
                        lines: Vec::new(),
                    })
                    .lines
                    .push(row.line);
            }
            Ok(grouped.into_values().collect())
        }
    }
}

pub async fn find_stock(
    pool: &PgPool,
    product_id: Option<i64>,
) -> LedgerResult<Vec<StorageWithStock>> {
    if let Some(id) = product_id {
        if id < 0 {
            return Err(LedgerError::invalid(format!(
                "product_id cannot be negative, got {}",
                id
            )));
        }
    }

    let mut uow = UnitOfWork::begin_read_only(pool, "find_stock").await?;
    let result = find_stock_tx(uow.tx(), product_id).await;
    uow.finish(result).await
}

pub async fn find_sales_tx(
    tx: &mut Transaction<'_, Postgres>,
    filter: &SaleFilter,
) -> LedgerResult<Vec<SaleRecord>> {
    let limit = effective_limit(filter.limit);
    let (start, end) = (filter.start_date, filter.end_date);

    let plan = SaleQueryPlan::from_filter(filter);
    tracing::debug!(?plan, limit, "Listing sales");

    let sales = match plan {
        SaleQueryPlan::DateRange => sale_repo::list_by_date_range_tx(tx, start, end, limit).await?,
        SaleQueryPlan::Storage(storage_id) => {
            sale_repo::list_by_storage_tx(tx, start, end, storage_id, limit).await?
        }
        SaleQueryPlan::ProductName(product_name) => {
            sale_repo::list_by_product_name_tx(tx, start, end, product_name, limit).await?
        }
        SaleQueryPlan::StorageAndProductName {
            storage_id,
            product_name,
        } => {
            sale_repo::list_by_storage_and_product_name_tx(
                tx,
                start,
                end,
                storage_id,
                product_name,
                limit,
            )
            .await?
        }
    };

    Ok(sales)
}

/// Sales inside an inclusive date range, optionally narrowed by storage and product name
pub async fn find_sales(pool: &PgPool, filter: &SaleFilter) -> LedgerResult<Vec<SaleRecord>> {
    validate_sale_filter(filter)?;

    let mut uow = UnitOfWork::begin_read_only(pool, "find_sales").await?;
    let result = find_sales_tx(uow.tx(), filter).await;
    uow.finish(result).await
}
