//! Refresh Error Types

use derive_more::{Display, Error};
use kbase_catalog::{ObjectId, ProviderCategory};

/// A refresh error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for resolution and refresh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a refresh failure.
///
/// ### Resolution Errors
/// - [`ErrorKind::ProviderNotFound`]
/// - [`ErrorKind::NoDefaultProvider`]
/// - [`ErrorKind::UnsupportedProvider`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Catalog`]
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Embedding`]
/// - [`ErrorKind::EmbeddingMismatch`]
/// - [`ErrorKind::Pipeline`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A provider or vector lookup in the catalog failed.
    Catalog,
    /// Connecting to, listing or reading a storage backend failed.
    Storage,
    /// Connecting to or calling an embedding backend failed.
    Embedding,
    /// The vector pipeline failed part way through a pass.
    Pipeline,
    /// A store names a model or embedding provider that doesn't exist.
    #[display("provider not found: {_0}")]
    ProviderNotFound(#[error(not(source))] ObjectId),
    /// A store defers to the default provider of a category, but `owner` has
    /// none (and neither does anyone else).
    #[display("no default {_0} provider available to `{_1}`")]
    NoDefaultProvider(#[error(not(source))] ProviderCategory, #[error(not(source))] String),
    /// A connector has no way to reach this type of provider.
    #[display("unsupported {_0} provider type `{_1}`")]
    UnsupportedProvider(#[error(not(source))] ProviderCategory, #[error(not(source))] String),
    /// The embedding backend returned a different number of embeddings than
    /// chunks it was given.
    #[display("embedding backend returned {returned} embeddings for {expected} chunks")]
    EmbeddingMismatch { expected: usize, returned: usize },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Embedding)
    }
}
