use time::OffsetDateTime;

/// One embedded chunk of a store file.
///
/// Vectors are keyed by `(owner, store, provider, file, chunk)`: re-indexing
/// a file with the same embedding provider overwrites its chunks in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    /// Owner of the store, so same-named stores of different tenants never
    /// share vectors.
    pub owner: String,
    pub store: String,
    /// Name of the embedding provider that produced `embedding`.
    pub provider: String,
    /// Storage key of the source file.
    pub file: String,
    pub chunk: u32,
    pub text: String,
    pub embedding: Vec<f32>,
    /// Tag identifying the model the store was configured with at indexing time.
    pub model: String,
    pub created_time: OffsetDateTime,
}
