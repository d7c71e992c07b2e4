//! `lectern ingest` — extract, chunk, embed, and index a document.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Map};

use crate::config::Config;
use crate::extract;
use crate::setup;

pub async fn run_ingest(config: &Config, file: &Path) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| file.display().to_string());

    let text = extract::extract_text(&filename, &bytes)?;

    let mut extra = Map::new();
    extra.insert("file_size".to_string(), json!(bytes.len()));
    extra.insert("text_length".to_string(), json!(text.chars().count()));

    let pipeline = setup::build_pipeline(config)?;
    let report = pipeline.ingest_document(&filename, &text, extra).await?;

    println!("ingest {}", report.filename);
    println!("  chunks stored: {}", report.chunks_stored);
    println!("ok");
    Ok(())
}
