//! Unit-of-Work boundary
//!
//! Every public ledger operation opens exactly one transaction here, hands
//! the handle down to the components, and finishes it here. Components take
//! `&mut Transaction<'_, Postgres>` and never commit or roll back themselves.

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{LedgerError, LedgerResult};

/// One all-or-nothing unit of work wrapping a Postgres transaction
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
    operation: &'static str,
}

impl UnitOfWork {
    /// Begin a read-write transaction for a mutating operation
    pub async fn begin(pool: &PgPool, operation: &'static str) -> LedgerResult<Self> {
        let tx = pool.begin().await?;
        tracing::debug!(operation, "Unit of work started");
        Ok(Self { tx, operation })
    }

    /// Begin a read-only transaction for a query operation
    ///
    /// Any write attempted through this handle is rejected by Postgres.
    pub async fn begin_read_only(pool: &PgPool, operation: &'static str) -> LedgerResult<Self> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        tracing::debug!(operation, "Read-only unit of work started");
        Ok(Self { tx, operation })
    }

    /// Transaction handle passed down to components
    pub fn tx(&mut self) -> &mut Transaction<'static, Postgres> {
        &mut self.tx
    }

    /// Commit on success, roll back on any error
    ///
    /// The operation's own error wins over a rollback failure; a failed
    /// commit surfaces as a database error.
    pub async fn finish<T>(self, result: LedgerResult<T>) -> LedgerResult<T> {
        let operation = self.operation;
        match result {
            Ok(value) => {
                self.tx.commit().await?;
                tracing::debug!(operation, "Unit of work committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.tx.rollback().await {
                    tracing::error!(
                        operation,
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }
                log_rollback(operation, &err);
                Err(err)
            }
        }
    }
}

fn log_rollback(operation: &'static str, err: &LedgerError) {
    match err {
        LedgerError::Database(_) => {
            tracing::error!(operation, kind = err.kind(), error = %err, "Unit of work rolled back");
        }
        _ => {
            tracing::warn!(operation, kind = err.kind(), error = %err, "Unit of work rolled back");
        }
    }
}
