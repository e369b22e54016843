//! Indexing a store's files into vectors.

use crate::connect::EmbeddingHandle;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use kbase_catalog::{ObjectId, Vector, VectorRepository};
use kbase_storage::{BackendHandle, FileInfo};
use std::path::Path;
use time::OffsetDateTime;
use tracing::instrument;

/// Everything one indexing pass needs to know.
pub struct IndexRequest<'a> {
    pub storage: &'a BackendHandle,
    pub embedding: &'a EmbeddingHandle,
    /// Only index files under this prefix; `None` means the whole store.
    pub prefix: Option<&'a Path>,
    /// The store being indexed. Vectors are scoped by its owner and name.
    pub store: &'a ObjectId,
    /// Name of the embedding provider, which scopes the vectors.
    pub embedding_provider: &'a str,
    /// Model tag recorded on every vector.
    pub model: &'a str,
    /// Most files this pass may index. Files without any text don't count.
    pub batch_limit: u32,
}

/// One bounded pass of embedding a store's content.
#[async_trait]
pub trait VectorPipeline: Send + Sync {
    /// Index up to `batch_limit` files that don't have vectors yet. Returns
    /// whether anything was indexed.
    async fn add_vectors(&self, request: IndexRequest<'_>) -> Result<bool>;
}

/// Pipeline that reads files from storage and keeps vectors in the catalog.
///
/// Files are picked in key order, skipping those that already have vectors
/// for the same store and embedding provider, so repeated passes work through
/// a store batch by batch. Each file's text is split on whitespace into
/// chunks of at most `chunk_size` characters and the whole file is embedded
/// in one call. Files without any text are never indexed and never count
/// towards the batch limit, so they can't stall later passes.
#[derive(Debug, Clone)]
pub struct StorageIndexer {
    vectors: VectorRepository,
    chunk_size: usize,
}

impl StorageIndexer {
    pub fn new(vectors: VectorRepository, chunk_size: usize) -> Self {
        Self { vectors, chunk_size }
    }

    async fn index_file(&self, request: &IndexRequest<'_>, file: &FileInfo) -> Result<bool> {
        let bytes = request.storage.read(&file.path).await.or_raise(|| ErrorKind::Storage)?;
        let chunks = chunk_text(&String::from_utf8_lossy(&bytes), self.chunk_size);
        if chunks.is_empty() {
            return Ok(false);
        }
        let embeddings = request.embedding.embed(&chunks).await.or_raise(|| ErrorKind::Embedding)?;
        if embeddings.len() != chunks.len() {
            exn::bail!(ErrorKind::EmbeddingMismatch { expected: chunks.len(), returned: embeddings.len() });
        }
        let key = file.key();
        let created_time = OffsetDateTime::now_utc();
        let vectors: Vec<Vector> = (0u32..)
            .zip(chunks.into_iter().zip(embeddings))
            .map(|(chunk, (text, embedding))| Vector {
                owner: request.store.owner.clone(),
                store: request.store.name.clone(),
                provider: request.embedding_provider.to_string(),
                file: key.clone(),
                chunk,
                text,
                embedding,
                model: request.model.to_string(),
                created_time,
            })
            .collect();
        self.vectors.upsert_many(&vectors).await.or_raise(|| ErrorKind::Catalog)?;
        tracing::debug!(file = %key, chunks = vectors.len(), "indexed file");
        Ok(true)
    }
}

#[async_trait]
impl VectorPipeline for StorageIndexer {
    #[instrument(skip_all, fields(store = %request.store, embedding = request.embedding_provider))]
    async fn add_vectors(&self, request: IndexRequest<'_>) -> Result<bool> {
        let indexed = self
            .vectors
            .indexed_files(request.store, request.embedding_provider)
            .await
            .or_raise(|| ErrorKind::Catalog)?;
        let listing = request.storage.list(request.prefix).await.or_raise(|| ErrorKind::Storage)?;
        let mut pending: Vec<(String, FileInfo)> = listing
            .into_iter()
            .filter(|file| file.size > 0)
            .map(|file| (file.key(), file))
            .filter(|(key, _)| !indexed.contains(key))
            .collect();
        pending.sort_by(|(a, _), (b, _)| a.cmp(b));
        let limit = usize::try_from(request.batch_limit).unwrap_or(usize::MAX);

        let (mut added, mut skipped) = (0usize, 0usize);
        for (_, file) in &pending {
            if added >= limit {
                break;
            }
            if self.index_file(&request, file).await? {
                added += 1;
            } else {
                skipped += 1;
            }
        }
        let remaining = pending.len() - added - skipped;
        tracing::info!(added, skipped, remaining, "indexing pass finished");
        Ok(added > 0)
    }
}

/// Split text on whitespace into chunks of at most `max_chars` characters.
///
/// Words are re-joined with single spaces. A word longer than `max_chars` is
/// split across chunks on character boundaries.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while !word.is_empty() {
            let separator = usize::from(current_len > 0);
            let room = max_chars.saturating_sub(current_len + separator);
            if word.len() <= room {
                if separator == 1 {
                    current.push(' ');
                }
                current.extend(&word);
                current_len += separator + word.len();
                word.clear();
            } else if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            } else {
                let rest = word.split_off(max_chars);
                chunks.push(word.iter().collect());
                word = rest;
            }
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEmbedder, Fixture};
    use std::sync::LazyLock;
    use kbase_storage::backend::MockBackend;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case("", 10, &[])]
    #[case("  \n\t ", 10, &[])]
    #[case("one two three", 100, &["one two three"])]
    #[case("one two three", 7, &["one two", "three"])]
    #[case("one\n\ntwo   three", 9, &["one two", "three"])]
    #[case("abcdefghij", 4, &["abcd", "efgh", "ij"])]
    #[case("ab cdefgh", 4, &["ab", "cdef", "gh"])]
    #[case("héllo wörld", 5, &["héllo", "wörld"])]
    fn test_chunk_text(#[case] text: &str, #[case] max: usize, #[case] expected: &[&str]) {
        assert_eq!(chunk_text(text, max), expected);
    }

    static STORE: LazyLock<ObjectId> = LazyLock::new(|| ObjectId::new("t1", "s1"));

    fn request<'a>(
        storage: &'a BackendHandle,
        embedding: &'a EmbeddingHandle,
        prefix: Option<&'a Path>,
        batch_limit: u32,
    ) -> IndexRequest<'a> {
        IndexRequest {
            storage,
            embedding,
            prefix,
            store: &STORE,
            embedding_provider: "emb",
            model: "gpt-4o",
            batch_limit,
        }
    }

    fn storage() -> BackendHandle {
        Arc::new(MockBackend::with_files([
            ("handbook/b.md", "beta text"),
            ("handbook/a.md", "alpha text here"),
            ("readme.md", "read me"),
            ("empty.md", ""),
        ]))
    }

    #[tokio::test]
    async fn test_passes_work_through_store_in_batches() {
        let fixture = Fixture::new().await;
        let indexer = StorageIndexer::new(fixture.vectors(), 1_000);
        let storage = storage();
        let embedding: EmbeddingHandle = Arc::new(FakeEmbedder::new("fake"));

        assert!(indexer.add_vectors(request(&storage, &embedding, None, 2)).await.unwrap());
        let indexed: Vec<_> = fixture.vectors().indexed_files(&STORE, "emb").await.unwrap().into_iter().collect();
        assert_eq!(indexed, ["handbook/a.md", "handbook/b.md"]);

        assert!(indexer.add_vectors(request(&storage, &embedding, None, 2)).await.unwrap());
        assert_eq!(fixture.vectors().count(&STORE, "emb").await.unwrap(), 3);
        assert!(!indexer.add_vectors(request(&storage, &embedding, None, 2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_vectors_carry_request_details() {
        let fixture = Fixture::new().await;
        let indexer = StorageIndexer::new(fixture.vectors(), 6);
        let storage = storage();
        let embedding: EmbeddingHandle = Arc::new(FakeEmbedder::new("fake"));

        assert!(indexer.add_vectors(request(&storage, &embedding, Some(Path::new("handbook/a.md")), 10)).await.unwrap());
        let vectors = fixture.vectors().list_for_file(&STORE, "emb", "handbook/a.md").await.unwrap();
        let texts: Vec<_> = vectors.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, ["alpha", "text", "here"]);
        assert_eq!(vectors[0].model, "gpt-4o");
        assert_eq!(vectors[2].chunk, 2);
        assert_eq!(vectors[2].embedding, FakeEmbedder::vector_for("here"));
    }

    #[tokio::test]
    async fn test_prefix_limits_scope() {
        let fixture = Fixture::new().await;
        let indexer = StorageIndexer::new(fixture.vectors(), 1_000);
        let storage = storage();
        let embedding: EmbeddingHandle = Arc::new(FakeEmbedder::new("fake"));

        assert!(indexer.add_vectors(request(&storage, &embedding, Some(Path::new("handbook")), 100)).await.unwrap());
        assert!(!indexer.add_vectors(request(&storage, &embedding, Some(Path::new("handbook")), 100)).await.unwrap());
        let indexed = fixture.vectors().indexed_files(&STORE, "emb").await.unwrap();
        assert!(!indexed.contains("readme.md"));
        assert!(!indexed.contains("empty.md"));
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch() {
        let fixture = Fixture::new().await;
        let indexer = StorageIndexer::new(fixture.vectors(), 1_000);
        let storage = storage();
        let embedding: EmbeddingHandle = Arc::new(FakeEmbedder::new("fake").dropping_last());

        let err = indexer.add_vectors(request(&storage, &embedding, None, 1)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::EmbeddingMismatch { expected: 1, returned: 0 }));
        assert_eq!(fixture.vectors().count(&STORE, "emb").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_files_do_not_use_up_batch() {
        let fixture = Fixture::new().await;
        let indexer = StorageIndexer::new(fixture.vectors(), 1_000);
        let storage: BackendHandle = Arc::new(MockBackend::with_files([
            ("a.md", " \n"),
            ("b.md", "\t"),
            ("c.md", "   "),
            ("d.md", "real content"),
        ]));
        let embedding: EmbeddingHandle = Arc::new(FakeEmbedder::new("fake"));

        assert!(indexer.add_vectors(request(&storage, &embedding, None, 3)).await.unwrap());
        let indexed: Vec<_> = fixture.vectors().indexed_files(&STORE, "emb").await.unwrap().into_iter().collect();
        assert_eq!(indexed, ["d.md"]);
        assert!(!indexer.add_vectors(request(&storage, &embedding, None, 3)).await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_limit_counts_indexed_files_only() {
        let fixture = Fixture::new().await;
        let indexer = StorageIndexer::new(fixture.vectors(), 1_000);
        let storage: BackendHandle = Arc::new(MockBackend::with_files([
            ("a.md", " "),
            ("b.md", "bee"),
            ("c.md", "sea"),
            ("d.md", "dee"),
        ]));
        let embedding: EmbeddingHandle = Arc::new(FakeEmbedder::new("fake"));

        assert!(indexer.add_vectors(request(&storage, &embedding, None, 2)).await.unwrap());
        let indexed: Vec<_> = fixture.vectors().indexed_files(&STORE, "emb").await.unwrap().into_iter().collect();
        assert_eq!(indexed, ["b.md", "c.md"]);
    }

    #[tokio::test]
    async fn test_stores_of_different_owners_are_indexed_separately() {
        let fixture = Fixture::new().await;
        let indexer = StorageIndexer::new(fixture.vectors(), 1_000);
        let storage = storage();
        let embedding: EmbeddingHandle = Arc::new(FakeEmbedder::new("fake"));
        let other = ObjectId::new("t2", "s1");

        assert!(indexer.add_vectors(request(&storage, &embedding, None, 100)).await.unwrap());
        let mut request = request(&storage, &embedding, None, 100);
        request.store = &other;
        assert!(indexer.add_vectors(request).await.unwrap());
        assert_eq!(fixture.vectors().count(&other, "emb").await.unwrap(), 3);
        assert_eq!(fixture.vectors().list_for_file(&other, "emb", "readme.md").await.unwrap()[0].owner, "t2");
    }
}
