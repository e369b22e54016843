use super::{SqliteQuery, from_timestamp, to_timestamp};
use crate::error::{Error, ErrorKind};
use crate::models::{File, Properties, Store};
use exn::ResultExt;
use std::collections::BTreeMap;

#[derive(sqlx::FromRow)]
pub(crate) struct StoreRow {
    owner: String,
    name: String,
    created_at: i64,
    display_name: String,
    storage_provider: String,
    model_provider: String,
    embedding_provider: String,
    frequency: i64,
    limit_minutes: i64,
    welcome: String,
    prompt: String,
    file_tree: Option<String>,
    properties: String,
}
impl StoreRow {
    /// Bind every column, in table order.
    pub(crate) fn bind(self, query: SqliteQuery<'_>) -> SqliteQuery<'_> {
        query
            .bind(self.owner)
            .bind(self.name)
            .bind(self.created_at)
            .bind(self.display_name)
            .bind(self.storage_provider)
            .bind(self.model_provider)
            .bind(self.embedding_provider)
            .bind(self.frequency)
            .bind(self.limit_minutes)
            .bind(self.welcome)
            .bind(self.prompt)
            .bind(self.file_tree)
            .bind(self.properties)
    }
}
impl TryFrom<&Store> for StoreRow {
    type Error = Error;
    fn try_from(store: &Store) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: store.owner.clone(),
            name: store.name.clone(),
            created_at: to_timestamp(store.created_time, "store creation time")?,
            display_name: store.display_name.clone(),
            storage_provider: store.storage_provider.clone(),
            model_provider: store.model_provider.clone(),
            embedding_provider: store.embedding_provider.clone(),
            frequency: i64::from(store.frequency),
            limit_minutes: i64::from(store.limit_minutes),
            welcome: store.welcome.clone(),
            prompt: store.prompt.clone(),
            file_tree: store
                .file_tree
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("file tree"))?,
            properties: serde_json::to_string(&store.properties).or_raise(|| ErrorKind::InvalidData("properties"))?,
        })
    }
}
impl TryFrom<StoreRow> for Store {
    type Error = Error;
    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: row.owner,
            name: row.name,
            created_time: from_timestamp(row.created_at, "store creation time")?,
            display_name: row.display_name,
            storage_provider: row.storage_provider,
            model_provider: row.model_provider,
            embedding_provider: row.embedding_provider,
            frequency: u32::try_from(row.frequency).or_raise(|| ErrorKind::InvalidData("frequency"))?,
            limit_minutes: u32::try_from(row.limit_minutes).or_raise(|| ErrorKind::InvalidData("limit minutes"))?,
            welcome: row.welcome,
            prompt: row.prompt,
            file_tree: row
                .file_tree
                .as_deref()
                .map(serde_json::from_str::<File>)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("file tree"))?,
            properties: serde_json::from_str::<BTreeMap<String, Properties>>(&row.properties)
                .or_raise(|| ErrorKind::InvalidData("properties"))?,
        })
    }
}
