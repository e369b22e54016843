//! Storage backends for the raw documents of a knowledge-base store.
//!
//! A store's files live behind a [`StorageBackend`]. The catalog only ever
//! sees listings ([`FileInfo`]) and file contents; where the bytes actually
//! live (a local directory, an in-memory map in tests) is decided by whoever
//! connects the backend.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
