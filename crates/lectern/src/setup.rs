//! Pipeline construction from configuration.
//!
//! Backend selection happens here and only here: the pipeline receives
//! trait objects and never learns which index or embedder is behind
//! them.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::warn;

use lectern_core::embedding::Embedder;
use lectern_core::index::memory::MemoryIndex;
use lectern_core::index::VectorIndex;
use lectern_core::models::ChunkParams;
use lectern_core::pipeline::RetrievalPipeline;

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::qdrant::QdrantIndex;

/// Build the configured vector index for the given vector dimension.
pub fn build_index(config: &Config, dims: usize) -> Result<Arc<dyn VectorIndex>> {
    match config.index.backend.as_str() {
        "memory" => {
            warn!("in-memory index holds no state across processes");
            Ok(Arc::new(MemoryIndex::new(&config.index.collection, dims)))
        }
        "qdrant" => {
            let url = match config.index.url.as_deref() {
                Some(url) => url,
                None => bail!("index.url (or QDRANT_URL) must be set for the qdrant backend"),
            };
            let api_key = std::env::var("QDRANT_API_KEY")
                .ok()
                .filter(|key| !key.is_empty());
            let index = QdrantIndex::new(
                url,
                api_key,
                &config.index.collection,
                dims,
                Duration::from_secs(config.index.timeout_secs),
            )?;
            Ok(Arc::new(index))
        }
        other => bail!("Unknown index backend: '{}'. Use memory or qdrant.", other),
    }
}

/// Build the full retrieval pipeline: embedder, index, chunking.
pub fn build_pipeline(config: &Config) -> Result<RetrievalPipeline> {
    let embedder: Arc<dyn Embedder> = create_embedder(&config.embedding)?;
    let index = build_index(config, embedder.dims())?;
    let params = ChunkParams::new(config.chunking.chunk_size, config.chunking.overlap)?;
    Ok(RetrievalPipeline::new(embedder, index, params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, EmbeddingConfig};

    fn hash_config() -> Config {
        Config {
            embedding: EmbeddingConfig {
                provider: "hash".to_string(),
                model: None,
                dims: Some(64),
            },
            ..Config::default()
        }
    }

    #[test]
    fn builds_a_memory_pipeline() {
        let config = hash_config();
        assert!(build_pipeline(&config).is_ok());
    }

    #[test]
    fn builds_a_qdrant_index() {
        let mut config = hash_config();
        config.index.backend = "qdrant".to_string();
        config.index.url = Some("http://localhost:6333".to_string());
        assert!(build_index(&config, 384).is_ok());
    }

    #[test]
    fn qdrant_without_url_fails() {
        let mut config = hash_config();
        config.index.backend = "qdrant".to_string();
        config.index.url = None;
        assert!(build_index(&config, 384).is_err());
    }

    #[test]
    fn unknown_backend_fails() {
        let mut config = hash_config();
        config.index.backend = "redis".to_string();
        assert!(build_index(&config, 384).is_err());
    }
}
