use async_trait::async_trait;
use reqwest::Client;
use semsearch_common::{Result, SemSearchError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::embedder::Embedder;
use crate::normalize::l2_normalize;
use crate::types::{EmbedRequest, EmbedResponse};

const MAX_RETRIES: u32 = 3;

/// Outcome of a failed request
///
/// Only connection failures and 5xx responses are worth another attempt.
#[derive(Debug)]
enum AttemptError {
    Transient(SemSearchError),
    Fatal(SemSearchError),
}

/// Ollama embedding client
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    batch_size: usize,
    client: Client,
}

impl OllamaEmbedder {
    /// Create new Ollama embedding client
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        batch_size: usize,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| SemSearchError::network(format!("Failed to create HTTP client: {}", e)))?;

        info!("Ollama embedder initialized: {} (model={})", base_url, model);
        Ok(Self {
            base_url,
            model,
            batch_size: batch_size.max(1),
            client,
        })
    }

    /// Number of texts sent per request
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Test connection to Ollama
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await
            .map_err(|e| SemSearchError::network(format!("Failed to connect to Ollama: {}", e)))?;
        Ok(response.status().is_success())
    }

    /// Embed one batch, retrying transient failures with exponential backoff
    async fn embed_batch_with_retry(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: self.model.clone(),
            input: batch.to_vec(),
        };

        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.try_embed(&url, &request).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Transient(e)) => {
                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_secs(2u64.pow(attempt - 1));
                        warn!(
                            "Embedding request failed (attempt {}/{}): {}. Retrying in {:?}...",
                            attempt, MAX_RETRIES, e, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SemSearchError::llm("All retries failed")))
    }

    /// Single attempt to embed a batch
    async fn try_embed(
        &self,
        url: &str,
        request: &EmbedRequest,
    ) -> std::result::Result<Vec<Vec<f32>>, AttemptError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AttemptError::Transient(SemSearchError::network(format!(
                    "Failed to send embedding request: {}",
                    e
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = SemSearchError::llm(format!(
                "Ollama embedding API error ({}): {}",
                status,
                body.trim()
            ));
            return Err(if status.is_server_error() {
                AttemptError::Transient(err)
            } else {
                AttemptError::Fatal(err)
            });
        }

        let result: EmbedResponse = response.json().await.map_err(|e| {
            AttemptError::Fatal(SemSearchError::llm(format!(
                "Failed to parse embedding response: {}",
                e
            )))
        })?;

        check_embeddings(&result.embeddings, request.input.len()).map_err(AttemptError::Fatal)?;
        Ok(result.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!(
                "Embedding batch {} ({} texts) - Model: {}",
                i + 1,
                batch.len(),
                self.model
            );
            let mut embeddings = self.embed_batch_with_retry(batch).await?;
            for embedding in embeddings.iter_mut() {
                l2_normalize(embedding);
            }
            vectors.extend(embeddings);
        }

        check_embeddings(&vectors, texts.len())?;
        Ok(vectors)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Reject responses that cannot be indexed: wrong count, empty or ragged vectors
fn check_embeddings(embeddings: &[Vec<f32>], expected: usize) -> Result<()> {
    if embeddings.len() != expected {
        return Err(SemSearchError::llm(format!(
            "Expected {} embeddings, received {}",
            expected,
            embeddings.len()
        )));
    }

    let Some(first) = embeddings.first() else {
        return Ok(());
    };
    if first.is_empty() {
        return Err(SemSearchError::llm("Empty embedding from Ollama"));
    }
    if let Some((i, e)) = embeddings
        .iter()
        .enumerate()
        .find(|(_, e)| e.len() != first.len())
    {
        return Err(SemSearchError::llm(format!(
            "Embedding {} has dimension {}, expected {}",
            i,
            e.len(),
            first.len()
        )));
    }

    Ok(())
}
