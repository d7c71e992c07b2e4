//! # Lectern Core
//!
//! Shared logic for Lectern's document question-answering pipeline:
//! data models, error taxonomy, text chunking, the embedder and
//! vector-index traits, an in-process index, and the retrieval
//! orchestrator that composes them.
//!
//! This crate contains no network, filesystem, or runtime dependencies.
//! Concrete embedding backends and the remote index implementation live
//! in the `lectern` application crate.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod index;
pub mod models;
pub mod pipeline;
