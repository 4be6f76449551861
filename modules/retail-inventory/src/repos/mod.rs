pub mod price_repo;
pub mod product_repo;
pub mod sale_repo;
pub mod stock_repo;
pub mod storage_repo;
