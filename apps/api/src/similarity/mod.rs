//! Vector similarity: pairwise scoring and the durable nearest-neighbour index.

use thiserror::Error;

pub mod index;
pub mod scorer;

pub use index::SimilarityIndex;
pub use scorer::similarity_score;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding is empty or has zero norm")]
    DegenerateVector,

    #[error("{vectors} vector(s) supplied with {labels} label(s)")]
    LengthMismatch { vectors: usize, labels: usize },

    #[error("Index I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index labels could not be encoded: {0}")]
    Serialize(#[from] serde_json::Error),
}
