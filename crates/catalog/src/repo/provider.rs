//! Repository for Provider records.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::id::ObjectId;
use crate::models::{Provider, ProviderCategory};
use crate::rows::ProviderRow;
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct ProviderRepository {
    pool: SqlitePool,
}
impl From<&Database> for ProviderRepository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl ProviderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Option<Provider>> {
        let row: Option<ProviderRow> = sqlx::query_as(include_str!("../../queries/get_provider.sql"))
            .bind(&id.owner)
            .bind(&id.name)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Provider::try_from).transpose()
    }

    /// The provider flagged as default for a category.
    ///
    /// A default registered by `owner` wins over one registered by any other
    /// owner (typically a system-wide tenant); among equals the newest wins.
    pub async fn get_default(&self, owner: &str, category: ProviderCategory) -> Result<Option<Provider>> {
        let row: Option<ProviderRow> = sqlx::query_as(include_str!("../../queries/get_default_provider.sql"))
            .bind(category.as_str())
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Provider::try_from).transpose()
    }

    /// A tenant's providers, most recently created first.
    pub async fn list(&self, owner: &str) -> Result<Vec<Provider>> {
        let rows: Vec<ProviderRow> = sqlx::query_as(include_str!("../../queries/list_providers.sql"))
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Provider::try_from).collect()
    }

    #[instrument(skip_all, fields(id = %provider.id()))]
    pub async fn insert(&self, provider: &Provider) -> Result<bool> {
        let result = ProviderRow::try_from(provider)?
            .bind(sqlx::query(include_str!("../../queries/insert_provider.sql")))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() != 0)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = sqlx::query(include_str!("../../queries/delete_provider.sql"))
            .bind(&id.owner)
            .bind(&id.name)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() != 0)
    }
}
