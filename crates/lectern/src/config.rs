//! TOML configuration with environment fallbacks.
//!
//! Every section has built-in defaults, so a missing config file is not
//! an error: the defaults apply, and `QDRANT_URL` / `QDRANT_COLLECTION`
//! in the environment switch the index to the remote backend. The
//! Qdrant API key is read from `QDRANT_API_KEY` only — never from the
//! config file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use lectern_core::models::ChunkParams;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IndexConfig {
    /// `"memory"` or `"qdrant"`.
    pub backend: String,
    /// Qdrant base URL; required for the qdrant backend. Falls back to
    /// `QDRANT_URL` when unset.
    pub url: Option<String>,
    pub collection: String,
    /// Per-request timeout for the remote backend.
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            url: None,
            collection: "lectern_documents".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `"local"` (fastembed) or `"hash"` (deterministic, model-free).
    pub provider: String,
    /// Model name for the local provider (default `all-minilm-l6-v2`).
    pub model: Option<String>,
    /// Vector dimensionality; inferred from the model name when unset.
    pub dims: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: None,
            dims: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: ChunkParams::DEFAULT_CHUNK_SIZE,
            overlap: ChunkParams::DEFAULT_OVERLAP,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Default number of chunks retrieved per question.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub max_messages: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/history.json"),
            max_messages: 50,
        }
    }
}

impl Config {
    /// Defaults plus environment overrides, used when no config file
    /// exists.
    fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("QDRANT_URL") {
            if !url.is_empty() {
                config.index.backend = "qdrant".to_string();
                config.index.url = Some(url);
            }
        }
        if let Ok(name) = std::env::var("QDRANT_COLLECTION") {
            if !name.is_empty() {
                config.index.collection = name;
            }
        }
        config
    }
}

/// Load, fill from the environment, and validate the configuration.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    } else {
        Config::from_env()
    };

    // A file-configured qdrant backend may still take its URL from the
    // environment.
    if config.index.backend == "qdrant" && config.index.url.is_none() {
        config.index.url = std::env::var("QDRANT_URL").ok().filter(|u| !u.is_empty());
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.index.backend.as_str() {
        "memory" => {}
        "qdrant" => {
            if config.index.url.is_none() {
                anyhow::bail!("index.url (or QDRANT_URL) must be set for the qdrant backend");
            }
        }
        other => anyhow::bail!("Unknown index backend: '{}'. Use memory or qdrant.", other),
    }

    match config.embedding.provider.as_str() {
        "local" | "hash" => {}
        other => anyhow::bail!("Unknown embedding provider: '{}'. Use local or hash.", other),
    }
    if config.embedding.dims == Some(0) {
        anyhow::bail!("embedding.dims must be > 0");
    }

    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.overlap >= config.chunking.chunk_size {
        anyhow::bail!(
            "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
            config.chunking.overlap,
            config.chunking.chunk_size
        );
    }

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if config.index.timeout_secs == 0 {
        anyhow::bail!("index.timeout_secs must be > 0");
    }

    if config.history.max_messages < 1 {
        anyhow::bail!("history.max_messages must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn parses_a_full_config() {
        let config: Config = toml::from_str(
            r#"
            [index]
            backend = "qdrant"
            url = "http://localhost:6333"
            collection = "docs"
            timeout_secs = 10

            [embedding]
            provider = "local"
            model = "bge-small-en-v1.5"

            [chunking]
            chunk_size = 800
            overlap = 150

            [retrieval]
            top_k = 3

            [history]
            path = "/tmp/history.json"
            max_messages = 10
            "#,
        )
        .unwrap();

        validate(&config).unwrap();
        assert_eq!(config.index.backend, "qdrant");
        assert_eq!(config.index.collection, "docs");
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[chunking]\nchunk_size = 500\n").unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.overlap, ChunkParams::DEFAULT_OVERLAP);
        assert_eq!(config.index.backend, "memory");
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let config: Config =
            toml::from_str("[chunking]\nchunk_size = 100\noverlap = 100\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_unknown_backend() {
        let config: Config = toml::from_str("[index]\nbackend = \"redis\"\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_qdrant_without_url() {
        let config: Config = toml::from_str("[index]\nbackend = \"qdrant\"\n").unwrap();
        let result = validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("QDRANT_URL"));
    }

    #[test]
    fn rejects_zero_top_k() {
        let config: Config = toml::from_str("[retrieval]\ntop_k = 0\n").unwrap();
        assert!(validate(&config).is_err());
    }
}
