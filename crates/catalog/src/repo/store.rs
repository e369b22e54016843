//! Repository for Store records.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::id::ObjectId;
use crate::models::Store;
use crate::rows::StoreRow;
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;

/// CRUD over stores, keyed by `(owner, name)`.
///
/// Every mutation reports whether it touched a row. Updates overwrite every
/// column with no versioning: two concurrent updates of the same store race
/// and the last one wins, including for fields the winner never meant to
/// change.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}
impl From<&Database> for StoreRepository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, query: &'static str, owner: Option<&str>) -> Result<Vec<Store>> {
        let mut query = sqlx::query_as::<_, StoreRow>(query);
        if let Some(owner) = owner {
            query = query.bind(owner);
        }
        let rows = query.fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Store::try_from).collect()
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Every store of every tenant, grouped by owner and newest first within
    /// each owner.
    pub async fn list_global(&self) -> Result<Vec<Store>> {
        self.fetch_all(include_str!("../../queries/list_global_stores.sql"), None).await
    }

    /// A tenant's stores, most recently created first.
    pub async fn list(&self, owner: &str) -> Result<Vec<Store>> {
        self.fetch_all(include_str!("../../queries/list_stores.sql"), Some(owner)).await
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Option<Store>> {
        let row: Option<StoreRow> = sqlx::query_as(include_str!("../../queries/get_store.sql"))
            .bind(&id.owner)
            .bind(&id.name)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Store::try_from).transpose()
    }

    /// The store a tenant gets when it doesn't ask for one by name.
    ///
    /// That is the newest store with a storage provider configured, or failing
    /// that the newest store at all.
    pub async fn get_default(&self, owner: &str) -> Result<Option<Store>> {
        let mut stores = self.list(owner).await?;
        if stores.is_empty() {
            return Ok(None);
        }
        let position = stores.iter().position(|s| !s.storage_provider.is_empty()).unwrap_or(0);
        Ok(Some(stores.swap_remove(position)))
    }

    // =========================================================================
    // Insert/Update/Delete
    // =========================================================================

    /// Insert a new store. Inserting over an existing `(owner, name)` is a
    /// [`Database`](ErrorKind::Database) error.
    #[instrument(skip_all, fields(id = %store.id()))]
    pub async fn insert(&self, store: &Store) -> Result<bool> {
        let row = StoreRow::try_from(store)?;
        let result = row
            .bind(sqlx::query(include_str!("../../queries/insert_store.sql")))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() != 0)
    }

    /// Overwrite every column of the store at `id` with `store`.
    ///
    /// `store` may carry a different owner or name, in which case the record
    /// is re-keyed. Returns `false` without writing if nothing exists at `id`.
    /// The existence check and the write are separate statements.
    #[instrument(skip(self, store))]
    pub async fn update(&self, id: &ObjectId, store: &Store) -> Result<bool> {
        if self.get(id).await?.is_none() {
            tracing::debug!("no store to update");
            return Ok(false);
        }
        let row = StoreRow::try_from(store)?;
        let result = row
            .bind(sqlx::query(include_str!("../../queries/update_store.sql")))
            .bind(&id.owner)
            .bind(&id.name)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() != 0)
    }

    /// Delete the store at `id`. Deleting something that isn't there is not
    /// an error; it just reports `false`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = sqlx::query(include_str!("../../queries/delete_store.sql"))
            .bind(&id.owner)
            .bind(&id.name)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() != 0)
    }
}
