use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use kbase_catalog::{ObjectId, Provider, ProviderCategory, ProviderRepository};

/// Where the resolver finds provider records.
#[async_trait]
pub trait ProviderLookup: Send + Sync {
    async fn get_provider(&self, id: &ObjectId) -> Result<Option<Provider>>;

    async fn default_provider(&self, owner: &str, category: ProviderCategory) -> Result<Option<Provider>>;
}

#[async_trait]
impl ProviderLookup for ProviderRepository {
    async fn get_provider(&self, id: &ObjectId) -> Result<Option<Provider>> {
        self.get(id).await.or_raise(|| ErrorKind::Catalog)
    }

    async fn default_provider(&self, owner: &str, category: ProviderCategory) -> Result<Option<Provider>> {
        self.get_default(owner, category).await.or_raise(|| ErrorKind::Catalog)
    }
}
