//! semsearch embedding backends
//!
//! `Embedder` trait and the Ollama HTTP implementation

mod client;
mod embedder;
mod normalize;
mod types;

pub use client::OllamaEmbedder;
pub use embedder::Embedder;
pub use normalize::l2_normalize;
pub use types::{EmbedRequest, EmbedResponse};
