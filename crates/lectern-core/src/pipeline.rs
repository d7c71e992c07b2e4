//! Retrieval pipeline orchestration.
//!
//! [`RetrievalPipeline`] composes the chunker, an [`Embedder`], and a
//! [`VectorIndex`] into the two operations the application exposes:
//! ingesting a document and retrieving context for a question. Both
//! collaborators are injected as trait objects, so the pipeline is
//! testable with a fake embedder and the in-memory index.

use std::sync::Arc;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunk::chunk_text;
use crate::embedding::Embedder;
use crate::error::Error;
use crate::index::VectorIndex;
use crate::models::{ChunkParams, IndexedPoint, IngestReport, PointPayload, SearchHit};

/// Composes chunking, embedding, and indexing into ingest and query
/// operations.
pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    params: ChunkParams,
}

impl RetrievalPipeline {
    /// Build a pipeline over the given collaborators. Fails fast on
    /// invalid chunk parameters.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        params: ChunkParams,
    ) -> Result<Self, Error> {
        params.validate()?;
        Ok(Self {
            embedder,
            index,
            params,
        })
    }

    pub fn chunk_params(&self) -> ChunkParams {
        self.params
    }

    /// Deterministic point id for a chunk: UUID v5 over
    /// `"{filename}_{chunk_index}"`. Stable across runs, so
    /// re-ingesting a file overwrites its points instead of duplicating
    /// them.
    pub fn chunk_id(filename: &str, chunk_index: usize) -> Uuid {
        Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("{filename}_{chunk_index}").as_bytes(),
        )
    }

    /// Chunk, embed, and index one document in a single batch.
    ///
    /// `extra` is merged into every chunk's payload. Returns
    /// [`Error::InvalidInput`] when the text yields no chunks, so
    /// callers can report "nothing to index" without a backend round
    /// trip.
    ///
    /// Concurrent ingestion of the same filename is last-writer-wins
    /// per point; when a re-ingest shrinks `total_chunks`, stale tail
    /// points from the previous generation remain until the file is
    /// deleted or re-ingested in full.
    pub async fn ingest_document(
        &self,
        filename: &str,
        raw_text: &str,
        extra: Map<String, Value>,
    ) -> Result<IngestReport, Error> {
        if filename.trim().is_empty() {
            return Err(Error::invalid_input("filename must not be empty"));
        }

        let chunks = chunk_text(raw_text, self.params.chunk_size, self.params.overlap);
        if chunks.is_empty() {
            return Err(Error::InvalidInput(format!(
                "no text to index in {filename}"
            )));
        }
        debug!(filename, chunks = chunks.len(), "chunked document");

        self.index.ensure_collection().await?;

        let total_chunks = chunks.len();
        let mut points = Vec::with_capacity(total_chunks);
        for (chunk_index, text) in chunks.into_iter().enumerate() {
            let vector = self.embedder.embed(&text).await?;
            let hash = format!("{:x}", Sha256::digest(text.as_bytes()));
            points.push(IndexedPoint {
                id: Self::chunk_id(filename, chunk_index),
                vector,
                payload: PointPayload {
                    text,
                    filename: filename.to_string(),
                    chunk_index,
                    total_chunks,
                    hash,
                    extra: extra.clone(),
                },
            });
        }

        let chunks_stored = self.index.upsert(points).await?;
        info!(filename, chunks_stored, "indexed document");

        Ok(IngestReport {
            filename: filename.to_string(),
            chunks_stored,
            message: format!("stored {chunks_stored} chunks"),
        })
    }

    /// Embed the question and return the top-k hits by descending
    /// cosine similarity, optionally restricted to one filename.
    ///
    /// An empty hit list is a successful empty result — the caller
    /// decides how to phrase "no relevant content". Backend failures
    /// propagate as errors and are never folded into an empty result.
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: usize,
        filename: Option<&str>,
    ) -> Result<Vec<SearchHit>, Error> {
        if question.trim().is_empty() {
            return Err(Error::invalid_input("question must not be empty"));
        }
        if top_k == 0 {
            return Err(Error::invalid_input("top_k must be at least 1"));
        }

        let query = self.embedder.embed(question).await?;
        let hits = self.index.search(&query, top_k, filename).await?;
        debug!(hits = hits.len(), "retrieved context chunks");
        Ok(hits)
    }
}
