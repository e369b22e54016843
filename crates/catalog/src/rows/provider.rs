use super::{SqliteQuery, from_timestamp, to_timestamp};
use crate::error::{Error, ErrorKind};
use crate::models::{Provider, ProviderCategory};
use exn::ResultExt;

#[derive(sqlx::FromRow)]
pub(crate) struct ProviderRow {
    owner: String,
    name: String,
    created_at: i64,
    display_name: String,
    category: String,
    provider_type: String,
    sub_type: String,
    endpoint: String,
    #[sqlx(default)]
    max_batch_size: Option<i64>,
    is_default: bool,
}
impl ProviderRow {
    /// Bind every column, in table order.
    pub(crate) fn bind(self, query: SqliteQuery<'_>) -> SqliteQuery<'_> {
        query
            .bind(self.owner)
            .bind(self.name)
            .bind(self.created_at)
            .bind(self.display_name)
            .bind(self.category)
            .bind(self.provider_type)
            .bind(self.sub_type)
            .bind(self.endpoint)
            .bind(self.max_batch_size)
            .bind(self.is_default)
    }
}
impl TryFrom<&Provider> for ProviderRow {
    type Error = Error;
    fn try_from(provider: &Provider) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: provider.owner.clone(),
            name: provider.name.clone(),
            created_at: to_timestamp(provider.created_time, "provider creation time")?,
            display_name: provider.display_name.clone(),
            category: provider.category.to_string(),
            provider_type: provider.provider_type.clone(),
            sub_type: provider.sub_type.clone(),
            endpoint: provider.endpoint.clone(),
            max_batch_size: provider.max_batch_size.map(i64::from),
            is_default: provider.is_default,
        })
    }
}
impl TryFrom<ProviderRow> for Provider {
    type Error = Error;
    fn try_from(row: ProviderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: row.owner,
            name: row.name,
            created_time: from_timestamp(row.created_at, "provider creation time")?,
            display_name: row.display_name,
            category: row.category.parse::<ProviderCategory>().or_raise(|| ErrorKind::InvalidData("category"))?,
            provider_type: row.provider_type,
            sub_type: row.sub_type,
            endpoint: row.endpoint,
            max_batch_size: row
                .max_batch_size
                .map(|size| u32::try_from(size).or_raise(|| ErrorKind::InvalidData("max batch size")))
                .transpose()?,
            is_default: row.is_default,
        })
    }
}
