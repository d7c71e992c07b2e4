//! Answer composition from retrieved context.
//!
//! The [`AnswerGenerator`] trait keeps answer generation opaque to the
//! retrieval pipeline: it receives the question and the retrieved
//! context texts and returns prose. The shipped [`TemplateAnswerer`]
//! formats a digest of the top contexts; an LLM-backed service would
//! implement the same trait.

use async_trait::async_trait;

/// Contexts quoted in a templated answer.
const MAX_CONTEXTS: usize = 3;
/// Longest excerpt quoted per context, in characters.
const MAX_CONTEXT_CHARS: usize = 500;

/// Opaque answer generation over retrieved contexts.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Produce an answer grounded in the contexts, ordered
    /// most-relevant first.
    async fn generate(&self, question: &str, contexts: &[String]) -> anyhow::Result<String>;
}

/// Template-based generator that quotes the top contexts.
pub struct TemplateAnswerer;

#[async_trait]
impl AnswerGenerator for TemplateAnswerer {
    async fn generate(&self, question: &str, contexts: &[String]) -> anyhow::Result<String> {
        let excerpts: Vec<String> = contexts
            .iter()
            .filter(|c| !c.trim().is_empty())
            .take(MAX_CONTEXTS)
            .map(|c| truncate_chars(c.trim(), MAX_CONTEXT_CHARS))
            .collect();

        if excerpts.is_empty() {
            return Ok(format!(
                "No relevant content found for \"{question}\". Try ingesting documents first."
            ));
        }

        Ok(format!(
            "Answer for \"{question}\", based on the indexed documents:\n\n{}",
            excerpts.join("\n\n---\n\n")
        ))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
