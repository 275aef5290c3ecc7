//! Boundary to the external semantic search collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One scored match from the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub file_name: String,
    pub content: String,
    pub score: f64,
}

/// Semantic search capability the specialist tools consume.
///
/// Index management, embeddings, and query internals live outside this crate;
/// only the retrieval contract is specified here.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Search within one document, identified by file name.
    async fn search_document(&self, file_name: &str, query: &str) -> Result<Vec<SearchHit>>;

    /// Search across every indexed document.
    async fn search_all_documents(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Render hits as the plain-text block handed to an agent as tool output.
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No relevant results found.".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. [{}] (score {:.3})\n{}",
                i + 1,
                hit.file_name,
                hit.score,
                hit.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
