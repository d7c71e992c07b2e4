//! In-process vector index.
//!
//! Keeps every point in an ordered `Vec` behind a `RwLock` and scans
//! all of them per query — O(n·D), exact cosine. Vectors are
//! L2-normalized at insertion so search reduces to a dot product.
//! Suitable for tests, development, and small corpora; holds no state
//! across process restarts.

use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::embedding::l2_normalize;
use crate::error::Error;
use crate::index::VectorIndex;
use crate::models::{CollectionStats, IndexedPoint, PointPayload, SearchHit};

struct StoredPoint {
    id: Uuid,
    /// Unit length (or all-zero for the blank-input sentinel).
    vector: Vec<f32>,
    payload: PointPayload,
}

/// In-memory [`VectorIndex`] with brute-force cosine search.
pub struct MemoryIndex {
    name: String,
    dims: usize,
    points: RwLock<Vec<StoredPoint>>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>, dims: usize) -> Self {
        Self {
            name: name.into(),
            dims,
            points: RwLock::new(Vec::new()),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_collection(&self) -> Result<(), Error> {
        // Nothing to create; the Vec is the collection.
        Ok(())
    }

    async fn upsert(&self, points: Vec<IndexedPoint>) -> Result<usize, Error> {
        for point in &points {
            if point.vector.len() != self.dims {
                return Err(Error::UpsertFailed {
                    reason: format!(
                        "vector dimension {} does not match collection dimension {}",
                        point.vector.len(),
                        self.dims
                    ),
                    attempted: points.len(),
                });
            }
        }

        let count = points.len();
        let mut stored = self.points.write().unwrap();
        for point in points {
            let mut vector = point.vector;
            l2_normalize(&mut vector);
            match stored.iter_mut().find(|s| s.id == point.id) {
                Some(slot) => {
                    slot.vector = vector;
                    slot.payload = point.payload;
                }
                None => stored.push(StoredPoint {
                    id: point.id,
                    vector,
                    payload: point.payload,
                }),
            }
        }
        debug!(count, total = stored.len(), "upserted points into in-memory index");
        Ok(count)
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filename: Option<&str>,
    ) -> Result<Vec<SearchHit>, Error> {
        let mut query = vector.to_vec();
        l2_normalize(&mut query);

        let stored = self.points.read().unwrap();
        let mut hits: Vec<SearchHit> = stored
            .iter()
            .filter(|s| filename.map_or(true, |f| s.payload.filename == f))
            .map(|s| SearchHit {
                text: s.payload.text.clone(),
                filename: s.payload.filename.clone(),
                chunk_index: s.payload.chunk_index,
                score: dot(&query, &s.vector),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete_by_filename(&self, filename: &str) -> Result<bool, Error> {
        let mut stored = self.points.write().unwrap();
        let before = stored.len();
        stored.retain(|s| s.payload.filename != filename);
        debug!(deleted = before - stored.len(), filename, "deleted points");
        Ok(true)
    }

    async fn list_filenames(&self) -> Result<Vec<String>, Error> {
        let stored = self.points.read().unwrap();
        let names: BTreeSet<String> = stored
            .iter()
            .map(|s| s.payload.filename.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn stats(&self) -> Result<CollectionStats, Error> {
        let stored = self.points.read().unwrap();
        Ok(CollectionStats {
            name: self.name.clone(),
            points_count: stored.len() as u64,
            vectors_count: Some(stored.len() as u64),
            status: "green".to_string(),
        })
    }
}
