//! `lectern ask` — retrieve context and compose an answer.
//!
//! Distinguishes "no hits" (a friendly no-content message) from
//! retrieval failures, which propagate as errors instead of being
//! masked as empty results.

use anyhow::Result;
use tracing::warn;

use crate::answer::{AnswerGenerator, TemplateAnswerer};
use crate::config::Config;
use crate::history::ChatHistory;
use crate::setup;

pub async fn run_ask(
    config: &Config,
    question: &str,
    top_k: Option<usize>,
    filename: Option<&str>,
) -> Result<()> {
    let pipeline = setup::build_pipeline(config)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let hits = pipeline.retrieve(question, top_k, filename).await?;

    if hits.is_empty() {
        println!(
            "I couldn't find any relevant information to answer that. \
             Make sure documents are ingested."
        );
        return Ok(());
    }

    let contexts: Vec<String> = hits.iter().map(|h| h.text.clone()).collect();
    let answer = TemplateAnswerer.generate(question, &contexts).await?;

    println!("{answer}");
    println!();
    println!("sources:");
    for hit in &hits {
        println!(
            "  {} [chunk {}] score {:.3}",
            hit.filename, hit.chunk_index, hit.score
        );
    }

    // Fire and forget: history problems never fail the query.
    let history = ChatHistory::new(config.history.path.clone(), config.history.max_messages);
    let sources: Vec<String> = hits
        .iter()
        .map(|h| format!("{}#{}", h.filename, h.chunk_index))
        .collect();
    if let Err(e) = history.add(question, &answer, sources) {
        warn!("failed to record chat history: {e:#}");
    }

    Ok(())
}
