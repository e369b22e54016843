//! Seams between provider records and the live clients they describe.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use kbase_catalog::{Provider, ProviderCategory};
use kbase_config::StorageConfig;
use kbase_storage::backend::LocalBackend;
use kbase_storage::{BackendHandle, validate_path};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type EmbeddingHandle = Arc<dyn EmbeddingClient + Send + Sync>;

/// A connected embedding backend.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Name of the client, for logging.
    fn name(&self) -> &str;

    /// Embed each text, returning one vector per input in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Turns storage references into connected backends.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    async fn connect(&self, provider: &Provider) -> Result<BackendHandle>;

    /// Connect from a bare reference, belonging to `owner`, that matched no
    /// provider record.
    async fn connect_raw(&self, owner: &str, reference: &str) -> Result<BackendHandle>;
}

#[async_trait]
pub trait EmbeddingConnector: Send + Sync {
    async fn connect(&self, provider: &Provider) -> Result<EmbeddingHandle>;
}

/// Connects storage providers of type `Local` to directories below a root.
///
/// Every owner gets its own directory under the root, named after the owner.
/// Inside it, a provider's directory is its `endpoint`, or its name when the
/// endpoint is empty, and a raw reference is used as the directory name
/// directly. Either way the directory must stay inside the owner's directory.
/// Nothing is created until the first write.
#[derive(Debug, Clone)]
pub struct LocalStorageConnector {
    root: PathBuf,
}
impl LocalStorageConnector {
    pub const PROVIDER_TYPE: &'static str = "Local";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn backend(&self, name: &str, owner: &str, directory: &str) -> Result<BackendHandle> {
        let owner_dir = validate_path(owner).or_raise(|| ErrorKind::Storage)?;
        if owner_dir.as_os_str() != owner || owner_dir.components().count() != 1 {
            exn::bail!(ErrorKind::Storage);
        }
        let directory = validate_path(directory).or_raise(|| ErrorKind::Storage)?;
        let root = self.root.join(owner_dir).join(directory);
        let backend = LocalBackend::new(name, root).or_raise(|| ErrorKind::Storage)?;
        Ok(Arc::new(backend))
    }
}
impl From<&StorageConfig> for LocalStorageConnector {
    fn from(config: &StorageConfig) -> Self {
        Self::new(&config.root)
    }
}

#[async_trait]
impl StorageConnector for LocalStorageConnector {
    async fn connect(&self, provider: &Provider) -> Result<BackendHandle> {
        if provider.provider_type != Self::PROVIDER_TYPE {
            exn::bail!(ErrorKind::UnsupportedProvider(ProviderCategory::Storage, provider.provider_type.clone()));
        }
        let directory = match provider.endpoint.as_str() {
            "" => provider.name.as_str(),
            endpoint => endpoint,
        };
        self.backend(&provider.name, &provider.owner, directory)
    }

    async fn connect_raw(&self, owner: &str, reference: &str) -> Result<BackendHandle> {
        self.backend(reference, owner, reference)
    }
}
