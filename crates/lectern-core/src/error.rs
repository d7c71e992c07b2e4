//! Error taxonomy for the retrieval pipeline.
//!
//! Every failure that crosses a component boundary is one of these
//! variants. Validation errors (`InvalidInput`) are raised before any
//! backend call; backend errors are translated into `BackendUnavailable`
//! or `UpsertFailed` at the index boundary and never escape as raw
//! transport errors. An empty search result is not an error.

/// Pipeline error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any model or backend call: empty question,
    /// `top_k` of zero, chunk parameters with `chunk_size <= overlap`,
    /// a document that yields no chunks.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding backend failed to initialize or encode. Fatal for
    /// the current request only; the next request retries lazy
    /// initialization.
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// The vector index is unreachable or timed out. Retryable by the
    /// caller; the pipeline itself never retries.
    #[error("vector backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A batch upsert did not complete. `attempted` is the number of
    /// points in the failed batch.
    #[error("upsert of {attempted} points failed: {reason}")]
    UpsertFailed { reason: String, attempted: usize },

    /// The requested document or collection does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Convenience constructor for validation failures.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}
