//! Repository for products and their variants
//!
//! Listing queries exclude logically removed products (`removed_at` set).

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};

use crate::models::{NewProduct, NewVariant};

/// Product row
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub added_at: DateTime<Utc>,
}

/// Variant row
#[derive(Debug, Clone, FromRow)]
pub struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub weight: i32,
    pub unit: String,
    pub added_at: DateTime<Utc>,
}

/// Insert a product header and return its id
pub async fn insert_product_tx(
    tx: &mut Transaction<'_, Postgres>,
    product: &NewProduct,
    added_at: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let tags: Vec<String> = product
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO products (name, description, added_at, tags)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(product.name.trim())
    .bind(&product.description)
    .bind(added_at)
    .bind(tags)
    .fetch_one(&mut **tx)
    .await
}

/// Insert a variant for an existing product and return its id
pub async fn insert_variant_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    variant: &NewVariant,
    added_at: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO product_variants (product_id, weight, unit, added_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(product_id)
    .bind(variant.weight)
    .bind(variant.unit.trim())
    .bind(added_at)
    .fetch_one(&mut **tx)
    .await
}

/// Find a product that has not been removed
pub async fn find_active_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, tags, added_at
        FROM products
        WHERE id = $1 AND removed_at IS NULL
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Stamp `removed_at` on a product; returns false if it was missing or already removed
pub async fn mark_removed_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    removed_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET removed_at = $2
        WHERE id = $1 AND removed_at IS NULL
        "#,
    )
    .bind(product_id)
    .bind(removed_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Plain limited scan
pub async fn list_tx(
    tx: &mut Transaction<'_, Postgres>,
    limit: i64,
) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, tags, added_at
        FROM products
        WHERE removed_at IS NULL
        ORDER BY id
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}

/// Products carrying an exact tag
pub async fn list_by_tag_tx(
    tx: &mut Transaction<'_, Postgres>,
    tag: &str,
    limit: i64,
) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, tags, added_at
        FROM products
        WHERE removed_at IS NULL
          AND $1 = ANY (tags)
        ORDER BY id
        LIMIT $2
        "#,
    )
    .bind(tag)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}

/// Products whose name contains a substring (case-insensitive)
pub async fn list_by_name_tx(
    tx: &mut Transaction<'_, Postgres>,
    name_substr: &str,
    limit: i64,
) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, tags, added_at
        FROM products
        WHERE removed_at IS NULL
          AND name ILIKE $1
        ORDER BY id
        LIMIT $2
        "#,
    )
    .bind(contains_pattern(name_substr))
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}

/// Products matching both a tag and a name substring
pub async fn list_by_tag_and_name_tx(
    tx: &mut Transaction<'_, Postgres>,
    tag: &str,
    name_substr: &str,
    limit: i64,
) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, tags, added_at
        FROM products
        WHERE removed_at IS NULL
          AND $1 = ANY (tags)
          AND name ILIKE $2
        ORDER BY id
        LIMIT $3
        "#,
    )
    .bind(tag)
    .bind(contains_pattern(name_substr))
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
}

/// Variants of a product, oldest first
pub async fn variants_for_product_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
) -> Result<Vec<VariantRow>, sqlx::Error> {
    sqlx::query_as::<_, VariantRow>(
        r#"
        SELECT id, product_id, weight, unit, added_at
        FROM product_variants
        WHERE product_id = $1
        ORDER BY id
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut **tx)
    .await
}

pub async fn variant_exists_tx(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM product_variants WHERE id = $1)")
        .bind(variant_id)
        .fetch_one(&mut **tx)
        .await
}

/// ILIKE pattern matching `needle` anywhere, with wildcards in the needle escaped
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_needle() {
        assert_eq!(contains_pattern("milk"), "%milk%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
