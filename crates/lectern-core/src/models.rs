//! Core data models for the retrieval pipeline.
//!
//! These types flow between the chunker, embedder, vector index, and
//! orchestrator. Payload shapes are `serde`-serializable because the
//! remote index stores them verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Error;

/// Chunking parameters, validated before any ingestion work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    /// Maximum chunk width in characters.
    pub chunk_size: usize,
    /// Characters of context shared between consecutive chunks.
    pub overlap: usize,
}

impl ChunkParams {
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    pub const DEFAULT_OVERLAP: usize = 200;

    /// Build validated parameters. Requires `chunk_size > overlap`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, Error> {
        let params = Self {
            chunk_size,
            overlap,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::invalid_input("chunk_size must be greater than 0"));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::invalid_input(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

/// Payload stored alongside each vector in the index.
///
/// `extra` carries caller-supplied metadata (file size, content type, …)
/// and is flattened into the same JSON object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointPayload {
    pub text: String,
    pub filename: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// SHA-256 of the chunk text, hex-encoded.
    pub hash: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A vector plus payload, keyed by a deterministic id.
///
/// The id is a pure function of `(filename, chunk_index)`, so
/// re-ingesting the same file overwrites its points instead of
/// duplicating them.
#[derive(Debug, Clone)]
pub struct IndexedPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// A ranked retrieval hit. Ephemeral — produced per query, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub text: String,
    pub filename: String,
    pub chunk_index: usize,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

/// Outcome of ingesting one document.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub filename: String,
    pub chunks_stored: usize,
    pub message: String,
}

/// Diagnostic snapshot of the collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub name: String,
    pub points_count: u64,
    /// Reported by backends that track vectors separately from points.
    pub vectors_count: Option<u64>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_params_default_is_valid() {
        assert!(ChunkParams::default().validate().is_ok());
    }

    #[test]
    fn chunk_params_rejects_zero_size() {
        assert!(ChunkParams::new(0, 0).is_err());
    }

    #[test]
    fn chunk_params_rejects_overlap_at_or_above_size() {
        assert!(ChunkParams::new(100, 100).is_err());
        assert!(ChunkParams::new(100, 150).is_err());
        assert!(ChunkParams::new(100, 99).is_ok());
    }

    #[test]
    fn payload_extra_flattens() {
        let mut extra = Map::new();
        extra.insert("file_size".to_string(), Value::from(1024));
        let payload = PointPayload {
            text: "hello".to_string(),
            filename: "notes.txt".to_string(),
            chunk_index: 0,
            total_chunks: 1,
            hash: "abc".to_string(),
            extra,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["filename"], "notes.txt");
        assert_eq!(json["file_size"], 1024);

        let back: PointPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.extra["file_size"], 1024);
        assert_eq!(back.total_chunks, 1);
    }
}
