use std::fmt;

/// Where a dimension mismatch was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionSite {
    /// The i-th vector passed to a build
    Vector(usize),

    /// The query vector passed to a search
    Query,
}

impl fmt::Display for DimensionSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector(i) => write!(f, "vector #{}", i),
            Self::Query => write!(f, "query vector"),
        }
    }
}

/// Vector index error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// Build called without any vectors
    #[error("cannot build an index from zero vectors")]
    EmptyInput,

    /// A vector length disagrees with the index dimension
    #[error("dimension mismatch at {position}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        position: DimensionSite,
    },

    /// Requested fewer than one neighbor
    #[error("invalid k: {k} (must be at least 1)")]
    InvalidK { k: usize },

    /// First vector has no components
    #[error("cannot build an index with dimension 0")]
    ZeroDimension,
}

/// semsearch error types
#[derive(Debug, thiserror::Error)]
pub enum SemSearchError {
    /// Vector index error
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Embedding backend error
    #[error("Embedding error: {0}")]
    Llm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Corpus produced no usable records
    #[error("Corpus has no valid records ({skipped} lines skipped)")]
    EmptyCorpus { skipped: usize },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SemSearchError {
    /// Create embedding backend error
    pub fn llm<S: Into<String>>(msg: S) -> Self {
        Self::Llm(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

// HTTP response conversion
impl SemSearchError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Index(IndexError::InvalidK { .. }) => 400,
            Self::Index(IndexError::DimensionMismatch { .. }) => 400,
            Self::Index(_) => 500,
            Self::InvalidInput(_) => 400,
            Self::EmptyCorpus { .. } => 500,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Llm(_) => 502,
            Self::Network(_) => 503,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = IndexError::DimensionMismatch {
            expected: 3,
            actual: 4,
            position: DimensionSite::Vector(2),
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch at vector #2: expected 3, got 4"
        );

        let err = IndexError::DimensionMismatch {
            expected: 384,
            actual: 768,
            position: DimensionSite::Query,
        };
        assert!(err.to_string().contains("query vector"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SemSearchError::from(IndexError::InvalidK { k: 0 }).status_code(), 400);
        assert_eq!(SemSearchError::from(IndexError::EmptyInput).status_code(), 500);
        assert_eq!(SemSearchError::invalid_input("blank").status_code(), 400);
        assert_eq!(SemSearchError::llm("down").status_code(), 502);
        assert_eq!(SemSearchError::network("refused").status_code(), 503);
    }
}
