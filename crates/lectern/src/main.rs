//! # Lectern CLI
//!
//! Command-line interface for the Lectern document question-answering
//! pipeline.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lectern ingest <file>` | Extract, chunk, embed, and index a document |
//! | `lectern ask "<question>"` | Retrieve context and compose an answer |
//! | `lectern documents` | List indexed documents |
//! | `lectern delete <filename>` | Remove a document's chunks from the index |
//! | `lectern stats` | Show collection statistics |
//! | `lectern history` | Show recent question/answer history |
//! | `lectern clear-history` | Clear the question/answer history |
//!
//! ## Examples
//!
//! ```bash
//! # Index a lecture transcript
//! lectern ingest notes/transcript.pdf
//!
//! # Ask against everything indexed
//! lectern ask "What are the ACID properties?"
//!
//! # Restrict retrieval to a single document
//! lectern ask "What is normalization?" --filename transcript.pdf --top-k 3
//! ```
//!
//! All commands accept `--config` pointing to a TOML configuration file;
//! without one, built-in defaults apply and `QDRANT_URL` /
//! `QDRANT_API_KEY` select the remote index.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lectern::history::ChatHistory;
use lectern::{ask, config, documents, ingest};

#[derive(Parser)]
#[command(
    name = "lectern",
    about = "Lectern — document question answering over a vector index",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/lectern.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a document: extract text, chunk, embed, and index it.
    Ingest {
        /// Document to ingest (.pdf, .docx, .txt, .md, or any text file).
        file: PathBuf,
    },

    /// Ask a question against the indexed documents.
    Ask {
        question: String,

        /// Number of context chunks to retrieve.
        #[arg(long)]
        top_k: Option<usize>,

        /// Restrict retrieval to a single document.
        #[arg(long)]
        filename: Option<String>,
    },

    /// List indexed documents.
    Documents,

    /// Delete all indexed chunks for a document.
    Delete { filename: String },

    /// Show collection statistics.
    Stats,

    /// Show recent question/answer history.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Clear the question/answer history.
    ClearHistory,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest { file } => ingest::run_ingest(&config, &file).await,
        Commands::Ask {
            question,
            top_k,
            filename,
        } => ask::run_ask(&config, &question, top_k, filename.as_deref()).await,
        Commands::Documents => documents::run_documents(&config).await,
        Commands::Delete { filename } => documents::run_delete(&config, &filename).await,
        Commands::Stats => documents::run_stats(&config).await,
        Commands::History { limit } => {
            let history =
                ChatHistory::new(config.history.path.clone(), config.history.max_messages);
            let messages = history.recent(limit);
            println!("history ({} messages)", messages.len());
            for message in &messages {
                println!(
                    "[{}] Q: {}",
                    message.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    message.question
                );
                println!("    A: {}", message.answer.lines().next().unwrap_or(""));
            }
            Ok(())
        }
        Commands::ClearHistory => {
            let history =
                ChatHistory::new(config.history.path.clone(), config.history.max_messages);
            history.clear()?;
            println!("history cleared");
            Ok(())
        }
    }
}
