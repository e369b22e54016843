//! Repository for Vector records.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::id::ObjectId;
use crate::models::Vector;
use crate::rows::VectorRow;
use exn::ResultExt;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use tracing::instrument;

/// Vectors of every store, scoped by the store's full `(owner, name)` id.
#[derive(Debug, Clone)]
pub struct VectorRepository {
    pool: SqlitePool,
}
impl From<&Database> for VectorRepository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl VectorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite vectors in a single transaction.
    #[instrument(skip_all, fields(count = vectors.len()))]
    pub async fn upsert_many(&self, vectors: &[Vector]) -> Result<()> {
        let rows = vectors.iter().map(VectorRow::try_from).collect::<Result<Vec<_>>>()?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for row in rows {
            row.bind(sqlx::query(include_str!("../../queries/upsert_vector.sql")))
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)
    }

    /// Keys of every file that has at least one vector for the given store and
    /// embedding provider.
    pub async fn indexed_files(&self, store: &ObjectId, provider: &str) -> Result<BTreeSet<String>> {
        let files: Vec<String> = sqlx::query_scalar(include_str!("../../queries/list_indexed_files.sql"))
            .bind(&store.owner)
            .bind(&store.name)
            .bind(provider)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(files.into_iter().collect())
    }

    /// A file's vectors in chunk order.
    pub async fn list_for_file(&self, store: &ObjectId, provider: &str, file: &str) -> Result<Vec<Vector>> {
        let rows: Vec<VectorRow> = sqlx::query_as(include_str!("../../queries/list_vectors_for_file.sql"))
            .bind(&store.owner)
            .bind(&store.name)
            .bind(provider)
            .bind(file)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Vector::try_from).collect()
    }

    pub async fn count(&self, store: &ObjectId, provider: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../../queries/count_vectors.sql"))
            .bind(&store.owner)
            .bind(&store.name)
            .bind(provider)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("vector count"))
    }

    /// Drop every vector of a store, across all embedding providers.
    #[instrument(skip(self))]
    pub async fn delete_for_store(&self, store: &ObjectId) -> Result<u64> {
        let result = sqlx::query(include_str!("../../queries/delete_vectors_for_store.sql"))
            .bind(&store.owner)
            .bind(&store.name)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }
}
