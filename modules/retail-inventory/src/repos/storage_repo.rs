use sqlx::{FromRow, Postgres, Transaction};

/// Storage (warehouse) row
#[derive(Debug, Clone, FromRow)]
pub struct Storage {
    pub id: i64,
    pub name: String,
}

pub async fn exists_tx(
    tx: &mut Transaction<'_, Postgres>,
    storage_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM storages WHERE id = $1)")
        .bind(storage_id)
        .fetch_one(&mut **tx)
        .await
}

pub async fn list_tx(tx: &mut Transaction<'_, Postgres>) -> Result<Vec<Storage>, sqlx::Error> {
    sqlx::query_as::<_, Storage>("SELECT id, name FROM storages ORDER BY id")
        .fetch_all(&mut **tx)
        .await
}
