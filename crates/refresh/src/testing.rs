//! Fakes shared by the tests in this crate.

use crate::connect::{EmbeddingClient, EmbeddingConnector, EmbeddingHandle, StorageConnector};
use crate::error::{ErrorKind, Result};
use crate::pipeline::{IndexRequest, VectorPipeline};
use crate::resolver::ProviderResolver;
use async_trait::async_trait;
use kbase_catalog::{Database, ObjectId, Provider, ProviderCategory, ProviderRepository, VectorRepository};
use kbase_storage::BackendHandle;
use kbase_storage::backend::MockBackend;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub(crate) fn provider(owner: &str, name: &str, category: ProviderCategory, provider_type: &str) -> Provider {
    Provider::new(owner, name, category, provider_type)
}

/// In-memory catalog plus fake connectors.
pub(crate) struct Fixture {
    db: Database,
    files: Vec<(String, String)>,
}

impl Fixture {
    pub(crate) async fn new() -> Self {
        let db = Database::connect_in_memory().await.unwrap();
        Self { db, files: Vec::new() }
    }

    /// Files every connected storage backend starts out with.
    pub(crate) fn with_files<'a>(mut self, files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.files = files.into_iter().map(|(path, data)| (path.to_string(), data.to_string())).collect();
        self
    }

    pub(crate) async fn add(&self, provider: Provider) {
        assert!(ProviderRepository::from(&self.db).insert(&provider).await.unwrap());
    }

    pub(crate) fn providers(&self) -> ProviderRepository {
        ProviderRepository::from(&self.db)
    }

    pub(crate) fn vectors(&self) -> VectorRepository {
        VectorRepository::from(&self.db)
    }

    pub(crate) fn resolver(&self) -> ProviderResolver {
        ProviderResolver::new(
            self.providers(),
            MockConnector { files: self.files.clone() },
            FakeEmbeddings,
        )
    }
}

/// Connects in-memory backends named after what they were connected from.
struct MockConnector {
    files: Vec<(String, String)>,
}
impl MockConnector {
    fn backend(&self, name: String) -> BackendHandle {
        let files = self.files.iter().map(|(path, data)| (path.as_str(), data.as_bytes()));
        Arc::new(MockBackend::with_files(files).with_name(name))
    }
}

#[async_trait]
impl StorageConnector for MockConnector {
    async fn connect(&self, provider: &Provider) -> Result<BackendHandle> {
        Ok(self.backend(format!("provider:{}", provider.name)))
    }

    async fn connect_raw(&self, owner: &str, reference: &str) -> Result<BackendHandle> {
        Ok(self.backend(format!("raw:{owner}/{reference}")))
    }
}

/// Hands out [`FakeEmbedder`]s, except for providers of type `Broken`.
pub(crate) struct FakeEmbeddings;

#[async_trait]
impl EmbeddingConnector for FakeEmbeddings {
    async fn connect(&self, provider: &Provider) -> Result<EmbeddingHandle> {
        if provider.provider_type == "Broken" {
            exn::bail!(ErrorKind::Embedding);
        }
        Ok(Arc::new(FakeEmbedder::new(format!("fake:{}", provider.name))))
    }
}

/// Embeds each text as `[chars, words]`.
pub(crate) struct FakeEmbedder {
    name: String,
    drop_last: bool,
}
impl FakeEmbedder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), drop_last: false }
    }

    /// Return one embedding fewer than asked for.
    pub(crate) fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    pub(crate) fn vector_for(text: &str) -> Vec<f32> {
        vec![text.chars().count() as f32, text.split_whitespace().count() as f32]
    }
}

#[async_trait]
impl EmbeddingClient for FakeEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings: Vec<_> = texts.iter().map(|text| Self::vector_for(text)).collect();
        if self.drop_last {
            embeddings.pop();
        }
        Ok(embeddings)
    }
}

/// What a pipeline was asked to do, with the handles reduced to their names.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) storage: String,
    pub(crate) embedding: String,
    pub(crate) prefix: Option<PathBuf>,
    pub(crate) store: ObjectId,
    pub(crate) embedding_provider: String,
    pub(crate) model: String,
    pub(crate) batch_limit: u32,
}

#[derive(Clone)]
pub(crate) struct RecordingPipeline {
    outcome: Option<bool>,
    calls: Arc<Mutex<Vec<RecordedRequest>>>,
}
impl RecordingPipeline {
    pub(crate) fn returning(outcome: bool) -> Self {
        Self { outcome: Some(outcome), calls: Arc::default() }
    }

    pub(crate) fn failing() -> Self {
        Self { outcome: None, calls: Arc::default() }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorPipeline for RecordingPipeline {
    async fn add_vectors(&self, request: IndexRequest<'_>) -> Result<bool> {
        self.calls.lock().unwrap().push(RecordedRequest {
            storage: request.storage.name().to_string(),
            embedding: request.embedding.name().to_string(),
            prefix: request.prefix.map(PathBuf::from),
            store: request.store.clone(),
            embedding_provider: request.embedding_provider.to_string(),
            model: request.model.to_string(),
            batch_limit: request.batch_limit,
        });
        self.outcome.ok_or_else(|| exn::Exn::from(ErrorKind::Storage))
    }
}
