use async_trait::async_trait;
use semsearch_common::Result;

/// Common trait for embedding backends
///
/// Implementations return exactly one unit-length vector per input text,
/// in input order, all sharing the model's dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Model identifier reported in stats
    fn model(&self) -> &str;
}
