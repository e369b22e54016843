use super::{SqliteQuery, from_timestamp, to_timestamp};
use crate::error::{Error, ErrorKind};
use crate::models::Vector;
use exn::ResultExt;

#[derive(sqlx::FromRow)]
pub(crate) struct VectorRow {
    owner: String,
    store: String,
    provider: String,
    file: String,
    chunk: i64,
    text: String,
    embedding: String,
    model: String,
    created_at: i64,
}
impl VectorRow {
    /// Bind every column, in table order.
    pub(crate) fn bind(self, query: SqliteQuery<'_>) -> SqliteQuery<'_> {
        query
            .bind(self.owner)
            .bind(self.store)
            .bind(self.provider)
            .bind(self.file)
            .bind(self.chunk)
            .bind(self.text)
            .bind(self.embedding)
            .bind(self.model)
            .bind(self.created_at)
    }
}
impl TryFrom<&Vector> for VectorRow {
    type Error = Error;
    fn try_from(vector: &Vector) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: vector.owner.clone(),
            store: vector.store.clone(),
            provider: vector.provider.clone(),
            file: vector.file.clone(),
            chunk: i64::from(vector.chunk),
            text: vector.text.clone(),
            embedding: serde_json::to_string(&vector.embedding).or_raise(|| ErrorKind::InvalidData("embedding"))?,
            model: vector.model.clone(),
            created_at: to_timestamp(vector.created_time, "vector creation time")?,
        })
    }
}
impl TryFrom<VectorRow> for Vector {
    type Error = Error;
    fn try_from(row: VectorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: row.owner,
            store: row.store,
            provider: row.provider,
            file: row.file,
            chunk: u32::try_from(row.chunk).or_raise(|| ErrorKind::InvalidData("chunk index"))?,
            text: row.text,
            embedding: serde_json::from_str(&row.embedding).or_raise(|| ErrorKind::InvalidData("embedding"))?,
            model: row.model,
            created_time: from_timestamp(row.created_at, "vector creation time")?,
        })
    }
}
