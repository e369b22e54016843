//! Database row shapes and their conversions to and from the public models.

mod provider;
mod store;
mod vector;

pub(crate) use self::provider::ProviderRow;
pub(crate) use self::store::StoreRow;
pub(crate) use self::vector::VectorRow;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use time::OffsetDateTime;

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Timestamps are stored as nanoseconds since the unix epoch, so records
/// created within the same second still sort by creation.
pub(crate) fn to_timestamp(time: OffsetDateTime, what: &'static str) -> Result<i64> {
    i64::try_from(time.unix_timestamp_nanos()).or_raise(|| ErrorKind::InvalidData(what))
}

pub(crate) fn from_timestamp(timestamp: i64, what: &'static str) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp)).or_raise(|| ErrorKind::InvalidData(what))
}
