//! semsearch vector search
//!
//! Corpus loading, the exact inner-product index and the query engine
//! that ties them to an embedding backend

mod corpus;
mod engine;
mod index;
mod types;

pub use corpus::{Corpus, SkipReason, SkippedLine};
pub use engine::SearchEngine;
pub use index::FlatIndex;
pub use types::{IndexStats, Neighbor, SearchResult, VectorId};
