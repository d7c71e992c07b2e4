//! Document management commands: list, delete, stats.

use anyhow::Result;

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::setup;

pub async fn run_documents(config: &Config) -> Result<()> {
    let embedder = create_embedder(&config.embedding)?;
    let index = setup::build_index(config, embedder.dims())?;
    index.ensure_collection().await?;

    let filenames = index.list_filenames().await?;
    println!("documents ({})", filenames.len());
    for name in &filenames {
        println!("  {name}");
    }
    println!("ok");
    Ok(())
}

pub async fn run_delete(config: &Config, filename: &str) -> Result<()> {
    let embedder = create_embedder(&config.embedding)?;
    let index = setup::build_index(config, embedder.dims())?;
    index.ensure_collection().await?;

    index.delete_by_filename(filename).await?;
    println!("deleted all chunks for {filename}");
    println!("ok");
    Ok(())
}

pub async fn run_stats(config: &Config) -> Result<()> {
    let embedder = create_embedder(&config.embedding)?;
    let index = setup::build_index(config, embedder.dims())?;
    index.ensure_collection().await?;

    // Stats are diagnostic: a backend failure degrades to a message
    // instead of an error exit.
    match index.stats().await {
        Ok(stats) => {
            println!("collection {}", stats.name);
            println!("  points: {}", stats.points_count);
            if let Some(vectors) = stats.vectors_count {
                println!("  vectors: {vectors}");
            }
            println!("  status: {}", stats.status);
        }
        Err(e) => println!("stats unavailable: {e}"),
    }
    Ok(())
}
