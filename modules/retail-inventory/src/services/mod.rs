pub mod catalog_query;
pub mod catalog_service;
pub mod price_ledger;
pub mod sale_recorder;
pub mod stock_reconciler;
