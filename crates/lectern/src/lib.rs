//! # Lectern
//!
//! Document question answering over a vector index.
//!
//! Lectern ingests documents (PDF, DOCX, plain text), splits them into
//! overlapping chunks, embeds each chunk, and indexes the vectors in
//! either an in-process index or a remote Qdrant collection. At query
//! time the question is embedded, the top-k most similar chunks are
//! retrieved, and an answer is composed from them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────┐   ┌───────────────┐
//! │ extract  │──▶│  RetrievalPipeline   │──▶│  VectorIndex   │
//! │ PDF/DOCX │   │  chunk → embed → id  │   │ memory/Qdrant │
//! └──────────┘   └──────────┬───────────┘   └──────┬────────┘
//!                           │ retrieve             │ search
//!                           ▼                      ▼
//!                     ┌──────────┐          ┌────────────┐
//!                     │  answer  │          │ SearchHits │
//!                     └──────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with environment fallbacks |
//! | [`embedding`] | Local (fastembed) and hashed embedding providers |
//! | [`qdrant`] | Remote vector index over the Qdrant REST API |
//! | [`extract`] | Document text extraction and cleanup |
//! | [`answer`] | Answer composition from retrieved context |
//! | [`history`] | Bounded question/answer log |
//! | [`setup`] | Pipeline construction from configuration |
//! | [`ingest`], [`ask`], [`documents`] | CLI command implementations |

pub mod answer;
pub mod ask;
pub mod config;
pub mod documents;
pub mod embedding;
pub mod extract;
pub mod history;
pub mod ingest;
pub mod qdrant;
pub mod setup;
