//! Vector index abstraction.
//!
//! The [`VectorIndex`] trait defines every storage operation the
//! retrieval pipeline needs, enabling pluggable backends selected by
//! configuration at construction time. The orchestrator never branches
//! on which backend is active.
//!
//! Two implementations conform to the contract:
//!
//! - [`memory::MemoryIndex`] — in-process, exact cosine over a linear
//!   scan; for tests, development, and small corpora.
//! - `QdrantIndex` (in the `lectern` application crate) — remote,
//!   approximate but horizontally scalable.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`ensure_collection`](VectorIndex::ensure_collection) | Idempotent collection creation |
//! | [`upsert`](VectorIndex::upsert) | Insert or overwrite points by id |
//! | [`search`](VectorIndex::search) | Top-k cosine search, optional filename filter |
//! | [`delete_by_filename`](VectorIndex::delete_by_filename) | Remove a document's points |
//! | [`list_filenames`](VectorIndex::list_filenames) | Distinct filenames, sorted |
//! | [`stats`](VectorIndex::stats) | Diagnostic snapshot |

pub mod memory;

use async_trait::async_trait;

use crate::error::Error;
use crate::models::{CollectionStats, IndexedPoint, SearchHit};

/// Abstract vector index for document chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist. Idempotent; must
    /// complete before any upsert or search.
    async fn ensure_collection(&self) -> Result<(), Error>;

    /// Insert or overwrite points keyed by id. Returns the number of
    /// points stored. Partial failure surfaces as
    /// [`Error::UpsertFailed`], never a silently short count.
    async fn upsert(&self, points: Vec<IndexedPoint>) -> Result<usize, Error>;

    /// Return at most `top_k` hits ranked by descending cosine
    /// similarity, optionally restricted to one filename. An empty
    /// collection or a filter with no matches yields an empty vector,
    /// not an error.
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filename: Option<&str>,
    ) -> Result<Vec<SearchHit>, Error>;

    /// Remove every point whose payload filename matches. Returns
    /// whether the operation completed; zero matches is still success.
    async fn delete_by_filename(&self, filename: &str) -> Result<bool, Error>;

    /// Every distinct filename in the collection, deduplicated and
    /// sorted. Pages through the backend when it paginates.
    async fn list_filenames(&self) -> Result<Vec<String>, Error>;

    /// Diagnostic snapshot of the collection.
    async fn stats(&self) -> Result<CollectionStats, Error>;
}
