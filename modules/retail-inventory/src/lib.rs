pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod models;
pub mod repos;
pub mod routes;
pub mod services;
pub mod uow;
pub mod validation;

pub use error::{LedgerError, LedgerResult};
pub use routes::inventory_router;
