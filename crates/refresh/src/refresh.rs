use crate::error::{ErrorKind, Result};
use crate::pipeline::{IndexRequest, VectorPipeline};
use crate::policy::BatchPolicy;
use crate::resolver::ProviderResolver;
use exn::ResultExt;
use kbase_catalog::Store;
use std::sync::Arc;
use tracing::instrument;

/// Drives vector refreshes of stores.
#[derive(Clone)]
pub struct Refresher {
    resolver: ProviderResolver,
    policy: BatchPolicy,
    pipeline: Arc<dyn VectorPipeline>,
}

impl Refresher {
    pub fn new(resolver: ProviderResolver, policy: BatchPolicy, pipeline: impl VectorPipeline + 'static) -> Self {
        Self { resolver, policy, pipeline: Arc::new(pipeline) }
    }

    pub fn resolver(&self) -> &ProviderResolver {
        &self.resolver
    }

    /// Run one indexing pass over the whole store.
    ///
    /// All three providers are resolved and the embedding client connected
    /// before the pipeline is called; if any of that fails nothing is indexed.
    /// Returns the pipeline's outcome as is. There are no retries, and a
    /// failed pass leaves whatever it already wrote in place.
    #[instrument(skip_all, fields(store = %store.id()))]
    pub async fn refresh_store_vectors(&self, store: &Store) -> Result<bool> {
        let store_id = store.id();
        let storage = self.resolver.storage_backend(store).await?;
        let model = self.resolver.model_provider(store).await?;
        let embedding = self.resolver.embedding_provider(store).await?;
        let client = self.resolver.embedding_client(&embedding).await?;
        let batch_limit = self.policy.limit_for(&embedding);
        tracing::info!(
            storage = storage.name(),
            model = %model.id(),
            embedding = %embedding.id(),
            batch_limit,
            "refreshing store vectors"
        );

        let request = IndexRequest {
            storage: &storage,
            embedding: &client,
            prefix: None,
            store: &store_id,
            embedding_provider: &embedding.name,
            model: &model.sub_type,
            batch_limit,
        };
        let added = self.pipeline.add_vectors(request).await.or_raise(|| ErrorKind::Pipeline)?;
        tracing::info!(added, "vector refresh finished");
        Ok(added)
    }
}
