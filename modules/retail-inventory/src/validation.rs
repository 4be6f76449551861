//! Precondition checks for ledger commands
//!
//! All checks are pure and run before a unit of work touches the database.
//! A failure here becomes `LedgerError::InvalidArgument`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::LedgerError;
use crate::models::{NewProduct, NewSale, NewVariant, SaleFilter, SetPrice, StockMovement};

/// Validation errors for ledger commands
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} must be a positive id, got {1}")]
    NonPositiveId(&'static str, i64),

    #[error("product name cannot be empty")]
    EmptyProductName,

    #[error("variant {0}: weight must be positive, got {1}")]
    NonPositiveWeight(usize, i32),

    #[error("variant {0}: unit cannot be empty")]
    EmptyUnit(usize),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("{0} is required")]
    MissingDate(&'static str),

    #[error("end_date {end} must be after start_date {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i32),

    #[error("limit cannot be negative, got {0}")]
    NegativeLimit(i64),
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}

pub fn validate_id(field: &'static str, id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::NonPositiveId(field, id));
    }
    Ok(())
}

/// Validate a product and its initial variants
pub fn validate_new_product(product: &NewProduct) -> Result<(), ValidationError> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::EmptyProductName);
    }

    for (idx, variant) in product.variants.iter().enumerate() {
        validate_new_variant(variant, idx)?;
    }

    Ok(())
}

pub fn validate_new_variant(variant: &NewVariant, index: usize) -> Result<(), ValidationError> {
    if variant.weight <= 0 {
        return Err(ValidationError::NonPositiveWeight(index, variant.weight));
    }
    if variant.unit.trim().is_empty() {
        return Err(ValidationError::EmptyUnit(index));
    }
    Ok(())
}

/// Validate a price command and return its start instant
pub fn validate_set_price(cmd: &SetPrice) -> Result<DateTime<Utc>, ValidationError> {
    validate_id("variant_id", cmd.variant_id)?;

    if cmd.price <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice(cmd.price));
    }

    let start = cmd
        .start_date
        .ok_or(ValidationError::MissingDate("start_date"))?;

    if let Some(end) = cmd.end_date {
        if end <= start {
            return Err(ValidationError::EndBeforeStart { start, end });
        }
    }

    Ok(start)
}

/// Validate a stock movement and return its movement instant
///
/// Every field is required and non-zero.
pub fn validate_stock_movement(cmd: &StockMovement) -> Result<DateTime<Utc>, ValidationError> {
    validate_id("variant_id", cmd.variant_id)?;
    validate_id("storage_id", cmd.storage_id)?;

    if cmd.quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity(cmd.quantity));
    }

    cmd.moved_at.ok_or(ValidationError::MissingDate("moved_at"))
}

pub fn validate_new_sale(cmd: &NewSale) -> Result<(), ValidationError> {
    validate_id("variant_id", cmd.variant_id)?;
    validate_id("storage_id", cmd.storage_id)?;

    if cmd.quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity(cmd.quantity));
    }

    Ok(())
}

pub fn validate_sale_filter(filter: &SaleFilter) -> Result<(), ValidationError> {
    if filter.start_date > filter.end_date {
        return Err(ValidationError::EndBeforeStart {
            start: filter.start_date,
            end: filter.end_date,
        });
    }

    if let Some(limit) = filter.limit {
        if limit < 0 {
            return Err(ValidationError::NegativeLimit(limit));
        }
    }

    // 0 means no storage filter
    if let Some(storage_id) = filter.storage_id.filter(|id| *id != 0) {
        validate_id("storage_id", storage_id)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn milk() -> NewProduct {
        NewProduct {
            name: "Milk".to_string(),
            description: "Whole milk".to_string(),
            tags: vec!["dairy".to_string()],
            variants: vec![NewVariant {
                weight: 1000,
                unit: "ml".to_string(),
            }],
        }
    }

    #[test]
    fn test_product_requires_name() {
        let mut product = milk();
        assert_eq!(validate_new_product(&product), Ok(()));

        product.name = "   ".to_string();
        assert_eq!(
            validate_new_product(&product),
            Err(ValidationError::EmptyProductName)
        );
    }

    #[test]
    fn test_product_variant_rules() {
        let mut product = milk();
        product.variants.push(NewVariant {
            weight: 0,
            unit: "g".to_string(),
        });
        assert_eq!(
            validate_new_product(&product),
            Err(ValidationError::NonPositiveWeight(1, 0))
        );

        product.variants[1].weight = 500;
        product.variants[1].unit = String::new();
        assert_eq!(
            validate_new_product(&product),
            Err(ValidationError::EmptyUnit(1))
        );
    }

    #[test]
    fn test_set_price_rules() {
        let mut cmd = SetPrice {
            variant_id: 1,
            price: Decimal::new(250, 2),
            start_date: Some(day(2024, 1, 1)),
            end_date: None,
        };
        assert_eq!(validate_set_price(&cmd), Ok(day(2024, 1, 1)));

        cmd.price = Decimal::ZERO;
        assert_eq!(
            validate_set_price(&cmd),
            Err(ValidationError::NonPositivePrice(Decimal::ZERO))
        );

        cmd.price = Decimal::new(-1, 0);
        assert!(validate_set_price(&cmd).is_err());

        cmd.price = Decimal::new(250, 2);
        cmd.start_date = None;
        assert_eq!(
            validate_set_price(&cmd),
            Err(ValidationError::MissingDate("start_date"))
        );

        cmd.start_date = Some(day(2024, 2, 1));
        cmd.end_date = Some(day(2024, 1, 1));
        assert!(matches!(
            validate_set_price(&cmd),
            Err(ValidationError::EndBeforeStart { .. })
        ));

        cmd.variant_id = 0;
        assert_eq!(
            validate_set_price(&cmd),
            Err(ValidationError::NonPositiveId("variant_id", 0))
        );
    }

    #[test]
    fn test_stock_movement_rejects_any_zero_field() {
        let ok = StockMovement {
            variant_id: 1,
            storage_id: 1,
            quantity: 50,
            moved_at: Some(day(2024, 1, 2)),
        };
        assert_eq!(validate_stock_movement(&ok), Ok(day(2024, 1, 2)));

        let cases = [
            StockMovement { variant_id: 0, ..ok.clone() },
            StockMovement { storage_id: 0, ..ok.clone() },
            StockMovement { quantity: 0, ..ok.clone() },
            StockMovement { quantity: -3, ..ok.clone() },
            StockMovement { moved_at: None, ..ok.clone() },
        ];
        for cmd in cases {
            assert!(validate_stock_movement(&cmd).is_err(), "{:?}", cmd);
        }
    }

    #[test]
    fn test_sale_rules() {
        let ok = NewSale {
            variant_id: 1,
            storage_id: 1,
            quantity: 5,
            sold_at: None,
        };
        assert_eq!(validate_new_sale(&ok), Ok(()));
        assert!(validate_new_sale(&NewSale { quantity: 0, ..ok.clone() }).is_err());
        assert!(validate_new_sale(&NewSale { storage_id: 0, ..ok.clone() }).is_err());
        assert!(validate_new_sale(&NewSale { variant_id: -1, ..ok }).is_err());
    }

    #[test]
    fn test_sale_filter_rules() {
        let mut filter = SaleFilter {
            start_date: day(2024, 1, 1),
            end_date: day(2024, 12, 31),
            limit: None,
            storage_id: None,
            product_name: None,
        };
        assert_eq!(validate_sale_filter(&filter), Ok(()));

        filter.limit = Some(-1);
        assert_eq!(
            validate_sale_filter(&filter),
            Err(ValidationError::NegativeLimit(-1))
        );

        filter.limit = Some(0);
        filter.storage_id = Some(0);
        assert_eq!(validate_sale_filter(&filter), Ok(()));

        filter.storage_id = Some(-1);
        assert_eq!(
            validate_sale_filter(&filter),
            Err(ValidationError::NonPositiveId("storage_id", -1))
        );

        filter.storage_id = None;
        filter.start_date = day(2025, 1, 1);
        assert!(validate_sale_filter(&filter).is_err());
    }

    #[test]
    fn test_validation_error_maps_to_invalid_argument() {
        let err: LedgerError = ValidationError::EmptyProductName.into();
        assert!(matches!(err, LedgerError::InvalidArgument(ref m) if m.contains("product name")));
    }
}
