//! SQLite catalog for knowledge-base stores.
//!
//! The catalog persists three kinds of records:
//! - **Stores**: tenant-scoped configuration, keyed by `(owner, name)`, that
//!   binds a file collection to a storage, a model and an embedding provider.
//!   The store's file tree and properties ride along as JSON blobs.
//! - **Providers**: owner-scoped descriptions of how to reach a backend, one
//!   of which per category may be flagged as the default.
//! - **Vectors**: embedded chunks of a store's files, written by the
//!   indexing pipeline.
//!
//! Lookups return `Option`: a missing record is not an error.

mod db;
pub mod error;
mod id;
mod models;
mod repo;
mod rows;

pub use crate::db::Database;
pub use crate::id::ObjectId;
pub use crate::models::{File, Properties, Provider, ProviderCategory, Store, Vector};
pub use crate::repo::{ProviderRepository, StoreRepository, VectorRepository};
