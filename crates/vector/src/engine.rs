use chrono::{DateTime, Utc};
use semsearch_common::{Result, SemSearchError};
use semsearch_embed::Embedder;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::corpus::Corpus;
use crate::index::FlatIndex;
use crate::types::{IndexStats, SearchResult};

/// Semantic search engine
///
/// Owns the corpus, its embedding index and the embedder used for queries.
/// Immutable after [`SearchEngine::build`], so it can be shared behind an
/// `Arc` and searched from many tasks at once.
pub struct SearchEngine {
    corpus: Corpus,
    index: FlatIndex,
    embedder: Arc<dyn Embedder>,
    built_at: DateTime<Utc>,
}

impl SearchEngine {
    /// Embed every corpus text and build the index
    pub async fn build(corpus: Corpus, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if corpus.is_empty() {
            return Err(SemSearchError::EmptyCorpus {
                skipped: corpus.skipped().len(),
            });
        }

        info!(
            "Embedding {} records with model {}",
            corpus.len(),
            embedder.model()
        );
        let started = Instant::now();

        let vectors = embedder.embed(corpus.texts()).await?;
        if vectors.len() != corpus.len() {
            return Err(SemSearchError::llm(format!(
                "Embedder returned {} vectors for {} texts",
                vectors.len(),
                corpus.len()
            )));
        }

        let index = FlatIndex::build(&vectors)?;

        info!(
            "Search engine ready - {} records, dimension {}, built in {:?}",
            index.len(),
            index.dimension(),
            started.elapsed()
        );

        Ok(Self {
            corpus,
            index,
            embedder,
            built_at: Utc::now(),
        })
    }

    /// Search for the records most similar to a free-text query
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SemSearchError::invalid_input("Query cannot be empty"));
        }

        debug!("Searching for: {} (top_k={})", query, top_k);

        let mut query_vectors = self.embedder.embed(&[query.to_string()]).await?;
        let query_vector = query_vectors
            .pop()
            .ok_or_else(|| SemSearchError::llm("Embedder returned no vector for the query"))?;

        let neighbors = self.index.search(&query_vector, top_k)?;

        let results: Vec<SearchResult> = neighbors
            .into_iter()
            .map(|n| SearchResult {
                rank: n.rank,
                score: n.score,
                id: n.id,
                text: self.corpus.texts()[n.id].clone(),
                record: self.corpus.records()[n.id].clone(),
            })
            .collect();

        debug!("Search completed - {} results", results.len());
        Ok(results)
    }

    /// Underlying vector index
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Get index statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.index.len(),
            dimension: self.index.dimension(),
            embedding_model: self.embedder.model().to_string(),
            text_key: self.corpus.text_key().to_string(),
            corpus_digest: self.corpus.digest().to_string(),
            skipped_lines: self.corpus.skipped().len(),
            built_at: self.built_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semsearch_common::IndexError;
    use semsearch_embed::l2_normalize;

    /// Keyword-count embedder: one dimension per vocabulary word
    struct KeywordEmbedder {
        vocabulary: Vec<&'static str>,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self {
                vocabulary: vec!["late", "penalty", "extension", "library", "exam"],
            }
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    let mut v: Vec<f32> = self
                        .vocabulary
                        .iter()
                        .map(|w| lower.matches(w).count() as f32)
                        .collect();
                    // Bias term keeps every vector non-zero
                    v.push(0.1);
                    l2_normalize(&mut v);
                    v
                })
                .collect())
        }

        fn model(&self) -> &str {
            "keyword-test"
        }
    }

    /// Embedder that drops every other vector
    struct LossyEmbedder;

    #[async_trait]
    impl Embedder for LossyEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().step_by(2).map(|_| vec![1.0]).collect())
        }

        fn model(&self) -> &str {
            "lossy-test"
        }
    }

    const POLICIES: &str = r#"{"id": "a", "text": "Late penalty: late work loses marks."}
{"id": "b", "text": "Library opening hours during exam season."}
broken line
{"id": "c", "text": "Request an extension before the deadline."}
"#;

    async fn engine() -> SearchEngine {
        let corpus = Corpus::parse(POLICIES, "text");
        SearchEngine::build(corpus, Arc::new(KeywordEmbedder::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_joins_records() {
        let engine = engine().await;
        let results = engine.search("late submission penalty", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[0].id, 0);
        assert_eq!(results[0].text, "Late penalty: late work loses marks.");
        assert_eq!(results[0].record["id"], "a");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_search_clamps_to_corpus_size() {
        let engine = engine().await;
        let results = engine.search("exam", 10).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].record["id"], "b");
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let engine = engine().await;
        let err = engine.search("   ", 3).await.unwrap_err();
        assert!(matches!(err, SemSearchError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_search_rejects_zero_k() {
        let engine = engine().await;
        let err = engine.search("exam", 0).await.unwrap_err();
        assert!(matches!(err, SemSearchError::Index(IndexError::InvalidK { k: 0 })));
    }

    #[tokio::test]
    async fn test_build_empty_corpus() {
        let corpus = Corpus::parse("nope\n{\"title\": \"x\"}\n", "text");
        let err = SearchEngine::build(corpus, Arc::new(KeywordEmbedder::new()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SemSearchError::EmptyCorpus { skipped: 2 }));
    }

    #[tokio::test]
    async fn test_build_rejects_short_embedding_output() {
        let corpus = Corpus::parse(POLICIES, "text");
        let err = SearchEngine::build(corpus, Arc::new(LossyEmbedder))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SemSearchError::Llm(_)));
    }

    #[tokio::test]
    async fn test_stats() {
        let engine = engine().await;
        let stats = engine.stats();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.dimension, 6);
        assert_eq!(stats.embedding_model, "keyword-test");
        assert_eq!(stats.text_key, "text");
        assert_eq!(stats.skipped_lines, 1);
        assert_eq!(stats.corpus_digest, engine.corpus().digest());
    }

    #[tokio::test]
    async fn test_concurrent_searches() {
        let engine = Arc::new(engine().await);
        let mut handles = Vec::new();
        for query in ["late", "library", "extension"] {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.search(query, 1).await.unwrap()[0].id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
