//! Vector refresh for knowledge-base stores.
//!
//! A store names its storage, model and embedding providers (or leaves them
//! empty to use the tenant's defaults). Refreshing a store's vectors means:
//! 1. resolving those references to providers ([`ProviderResolver`]),
//! 2. connecting the storage backend and the embedding client,
//! 3. choosing how many files one pass may process ([`BatchPolicy`]),
//! 4. handing everything to a [`VectorPipeline`].
//!
//! [`Refresher`] strings these together. [`store_file_tree`] reuses the same
//! resolution to rebuild a store's file tree from its storage listing.

mod connect;
pub mod error;
mod lookup;
mod pipeline;
mod policy;
mod refresh;
mod resolver;
#[cfg(test)]
mod testing;
mod tree;

pub use crate::connect::{
    EmbeddingClient, EmbeddingConnector, EmbeddingHandle, LocalStorageConnector, StorageConnector,
};
pub use crate::lookup::ProviderLookup;
pub use crate::pipeline::{IndexRequest, StorageIndexer, VectorPipeline};
pub use crate::policy::BatchPolicy;
pub use crate::refresh::Refresher;
pub use crate::resolver::ProviderResolver;
pub use crate::tree::store_file_tree;
