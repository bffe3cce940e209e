use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of a vector in insertion order, starting at 0
pub type VectorId = usize;

/// One entry of an index search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// 1-based rank
    pub rank: usize,

    /// Inner product with the query (cosine similarity for unit vectors)
    pub score: f32,

    /// Identifier of the matched vector
    pub id: VectorId,
}

/// Search result joined back to its source record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based rank
    pub rank: usize,

    /// Similarity score (higher is more similar)
    pub score: f32,

    /// Record identifier (line order among valid records)
    pub id: VectorId,

    /// Matched text
    pub text: String,

    /// Full source record
    pub record: serde_json::Value,
}

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed records
    pub total_documents: usize,

    /// Embedding dimension
    pub dimension: usize,

    /// Embedding model used
    pub embedding_model: String,

    /// Record key the texts were read from
    pub text_key: String,

    /// SHA-256 of the corpus bytes
    pub corpus_digest: String,

    /// Corpus lines that were not indexed
    pub skipped_lines: usize,

    /// When the index was built
    pub built_at: DateTime<Utc>,
}
