//! Bounded question/answer history.
//!
//! A JSON-file log of Q&A exchanges, capped to the most recent N
//! messages. Writes are best-effort from the query path's perspective:
//! callers log failures and move on — a broken history file never
//! fails a query. A file that cannot be parsed reads as empty.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// One recorded Q&A exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    /// Source identifiers of the chunks that grounded the answer.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    pub total_messages: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// File-backed chat history.
pub struct ChatHistory {
    path: PathBuf,
    max_messages: usize,
}

impl ChatHistory {
    pub fn new(path: PathBuf, max_messages: usize) -> Self {
        Self { path, max_messages }
    }

    fn load(&self) -> Vec<ChatMessage> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn save(&self, messages: &[ChatMessage]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(messages)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Append one exchange, dropping the oldest entries past the cap.
    pub fn add(
        &self,
        question: &str,
        answer: &str,
        sources: Vec<String>,
    ) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            question: question.to_string(),
            answer: answer.to_string(),
            sources,
        };

        let mut messages = self.load();
        messages.push(message.clone());
        if messages.len() > self.max_messages {
            let excess = messages.len() - self.max_messages;
            messages.drain(..excess);
        }
        self.save(&messages)?;
        debug!(id = %message.id, "recorded chat message");
        Ok(message)
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ChatMessage> {
        let messages = self.load();
        let skip = messages.len().saturating_sub(limit);
        messages.into_iter().skip(skip).collect()
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }

    pub fn stats(&self) -> HistoryStats {
        let messages = self.load();
        HistoryStats {
            total_messages: messages.len(),
            oldest: messages.first().map(|m| m.timestamp),
            newest: messages.last().map(|m| m.timestamp),
        }
    }
}
