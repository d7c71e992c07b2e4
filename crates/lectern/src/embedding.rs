//! Embedding providers.
//!
//! Two implementations of the core [`Embedder`] trait:
//!
//! - **[`LocalEmbedder`]** — runs a sentence-embedding model via
//!   fastembed. The model handle is a process-wide lazy singleton: the
//!   first embed call loads it (single-flight — concurrent first calls
//!   trigger exactly one load), later calls reuse it, and a failed load
//!   is retried by the next request.
//! - **[`HashEmbedder`]** — deterministic hashed bag-of-words with no
//!   model or network dependency. Retrieval quality is lexical only;
//!   intended for tests, development, and offline smoke runs.
//!
//! Both honor the blank-input contract: empty or whitespace-only text
//! embeds to the all-zero vector without touching any model.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use lectern_core::embedding::{l2_normalize, zero_vector, Embedder};
use lectern_core::error::Error;

use crate::config::EmbeddingConfig;

pub const DEFAULT_MODEL: &str = "all-minilm-l6-v2";
pub const DEFAULT_DIMS: usize = 384;

/// Create the configured embedding provider.
pub fn create_embedder(config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(
            config.dims.unwrap_or(DEFAULT_DIMS),
        ))),
        #[cfg(feature = "local-embeddings")]
        "local" => Ok(Arc::new(LocalEmbedder::new(config)?)),
        #[cfg(not(feature = "local-embeddings"))]
        "local" => anyhow::bail!(
            "The local embedding provider requires the local-embeddings feature"
        ),
        other => anyhow::bail!("Unknown embedding provider: '{}'. Use local or hash.", other),
    }
}

// ============ Local provider (fastembed) ============

/// One model per process: the first successful initialization wins and
/// every [`LocalEmbedder`] instance shares it.
#[cfg(feature = "local-embeddings")]
static LOCAL_MODEL: once_cell::sync::OnceCell<std::sync::Mutex<fastembed::TextEmbedding>> =
    once_cell::sync::OnceCell::new();

/// Embedding provider backed by a locally-run sentence-embedding model.
///
/// Construction only resolves the model name and dimensionality; the
/// model itself is downloaded/loaded on the first embed call.
#[cfg(feature = "local-embeddings")]
pub struct LocalEmbedder {
    model_name: String,
    model: fastembed::EmbeddingModel,
    dims: usize,
}

#[cfg(feature = "local-embeddings")]
impl LocalEmbedder {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let model_name = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let model = fastembed_model(&model_name)?;
        let dims = config.dims.unwrap_or_else(|| default_dims(&model_name));
        Ok(Self {
            model_name,
            model,
            dims,
        })
    }
}

#[cfg(feature = "local-embeddings")]
fn fastembed_model(name: &str) -> anyhow::Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        "multilingual-e5-small" => Ok(fastembed::EmbeddingModel::MultilingualE5Small),
        other => anyhow::bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, \
             nomic-embed-text-v1.5, multilingual-e5-small",
            other
        ),
    }
}

#[cfg(feature = "local-embeddings")]
fn default_dims(name: &str) -> usize {
    match name {
        "all-minilm-l6-v2" => 384,
        "bge-small-en-v1.5" => 384,
        "bge-base-en-v1.5" => 768,
        "nomic-embed-text-v1.5" => 768,
        "multilingual-e5-small" => 384,
        _ => DEFAULT_DIMS,
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        if text.trim().is_empty() {
            return Ok(zero_vector(self.dims));
        }

        let model = self.model.clone();
        let model_name = self.model_name.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let cell = LOCAL_MODEL.get_or_try_init(|| {
                tracing::info!(model = %model_name, "loading embedding model");
                fastembed::TextEmbedding::try_new(
                    fastembed::InitOptions::new(model).with_show_download_progress(false),
                )
                .map(std::sync::Mutex::new)
                .map_err(|e| {
                    Error::ModelUnavailable(format!("failed to initialize {model_name}: {e}"))
                })
            })?;

            let mut model = cell.lock().unwrap();
            let mut vectors = model
                .embed(vec![text], None)
                .map_err(|e| Error::ModelUnavailable(format!("embedding failed: {e}")))?;
            vectors
                .pop()
                .ok_or_else(|| Error::ModelUnavailable("empty embedding batch".to_string()))
        })
        .await
        .map_err(|e| Error::ModelUnavailable(format!("embedding task panicked: {e}")))?
    }
}

// ============ Hash provider ============

/// Deterministic hashed bag-of-words embedder.
///
/// Tokens are lowercased alphanumeric runs; each token's SHA-256 picks
/// one dimension, and the counts are L2-normalized. Vectors are stable
/// across processes and platforms.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "hashed-bow"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        if text.trim().is_empty() {
            return Ok(zero_vector(self.dims));
        }

        let mut vector = vec![0.0f32; self.dims];
        let lower = text.to_lowercase();
        for token in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.as_bytes());
            let bucket = u64::from_le_bytes(digest[..8].try_into().unwrap()) % self.dims as u64;
            vector[bucket as usize] += 1.0;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_input_is_the_zero_vector() {
        let embedder = HashEmbedder::new(384);
        for text in ["", "   ", "\n\t"] {
            let v = embedder.embed(text).await.unwrap();
            assert_eq!(v.len(), 384);
            assert!(v.iter().all(|&x| x == 0.0), "input {text:?}");
        }
    }

    #[tokio::test]
    async fn identical_input_embeds_identically() {
        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("cats are mammals").await.unwrap();
        let b = embedder.embed("cats are mammals").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn different_texts_embed_differently() {
        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("cats are mammals").await.unwrap();
        let b = embedder.embed("fish are not").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn vectors_are_unit_length() {
        let embedder = HashEmbedder::new(384);
        let v = embedder.embed("the quick brown fox").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_tokens_raise_similarity() {
        use lectern_core::embedding::cosine_similarity;

        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("cats are mammals").await.unwrap();
        let b = embedder.embed("what are mammals").await.unwrap();
        let c = embedder.embed("ships sail oceans").await.unwrap();
        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
    }

    #[test]
    fn create_embedder_rejects_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "cloud".to_string(),
            model: None,
            dims: None,
        };
        assert!(create_embedder(&config).is_err());
    }

    #[test]
    fn hash_provider_respects_configured_dims() {
        let config = EmbeddingConfig {
            provider: "hash".to_string(),
            model: None,
            dims: Some(64),
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.dims(), 64);
    }
}
