use crate::connect::{EmbeddingConnector, EmbeddingHandle, StorageConnector};
use crate::error::{ErrorKind, Result};
use crate::lookup::ProviderLookup;
use kbase_catalog::{Provider, ProviderCategory, Store};
use kbase_storage::BackendHandle;
use std::sync::Arc;
use tracing::instrument;

/// Resolves a store's provider references.
///
/// An empty reference means "the default provider of that category"; anything
/// else names a provider owned by the store's owner. Nothing is cached: every
/// call goes back to the lookup.
#[derive(Clone)]
pub struct ProviderResolver {
    lookup: Arc<dyn ProviderLookup>,
    storage: Arc<dyn StorageConnector>,
    embeddings: Arc<dyn EmbeddingConnector>,
}

impl ProviderResolver {
    pub fn new(
        lookup: impl ProviderLookup + 'static,
        storage: impl StorageConnector + 'static,
        embeddings: impl EmbeddingConnector + 'static,
    ) -> Self {
        Self {
            lookup: Arc::new(lookup),
            storage: Arc::new(storage),
            embeddings: Arc::new(embeddings),
        }
    }

    async fn find(&self, store: &Store, category: ProviderCategory) -> Result<Option<Provider>> {
        let provider = match store.provider_id(category) {
            Some(id) => self.lookup.get_provider(&id).await?,
            None => self.lookup.default_provider(&store.owner, category).await?,
        };
        tracing::debug!(%category, provider = provider.as_ref().map(|p| p.name.as_str()), "provider lookup");
        Ok(provider)
    }

    async fn require(&self, store: &Store, category: ProviderCategory) -> Result<Provider> {
        if let Some(provider) = self.find(store, category).await? {
            return Ok(provider);
        }
        match store.provider_id(category) {
            Some(id) => exn::bail!(ErrorKind::ProviderNotFound(id)),
            None => exn::bail!(ErrorKind::NoDefaultProvider(category, store.owner.clone())),
        }
    }

    /// Connect the store's storage backend.
    ///
    /// A reference that matches no provider record is not an error: it is
    /// handed to the connector as a raw reference instead.
    #[instrument(skip_all, fields(store = %store.id()))]
    pub async fn storage_backend(&self, store: &Store) -> Result<BackendHandle> {
        match self.find(store, ProviderCategory::Storage).await? {
            Some(provider) => self.storage.connect(&provider).await,
            None => {
                tracing::warn!(reference = %store.storage_provider, "no storage provider record, connecting raw reference");
                self.storage.connect_raw(&store.owner, &store.storage_provider).await
            },
        }
    }

    #[instrument(skip_all, fields(store = %store.id()))]
    pub async fn model_provider(&self, store: &Store) -> Result<Provider> {
        self.require(store, ProviderCategory::Model).await
    }

    #[instrument(skip_all, fields(store = %store.id()))]
    pub async fn embedding_provider(&self, store: &Store) -> Result<Provider> {
        self.require(store, ProviderCategory::Embedding).await
    }

    pub async fn embedding_client(&self, provider: &Provider) -> Result<EmbeddingHandle> {
        self.embeddings.connect(provider).await
    }
}
