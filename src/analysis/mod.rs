//! Per-chunk analysis: acoustic stress features and semantic intent.

#[cfg(feature = "embeddings")]
pub mod embedder;
pub mod paralinguistic;
pub mod semantic;

#[cfg(feature = "embeddings")]
pub use embedder::CandleSentenceEncoder;
pub use paralinguistic::ParalinguisticAnalyzer;
pub use semantic::{SemanticAnalyzer, SentenceEncoder, cosine_similarity};
