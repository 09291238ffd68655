//! Numerical model providers
//!
//! The recommender only needs two matrices from the outside world: course x
//! course similarity and user x course predicted ratings. Each comes from a
//! provider behind a trait, so the training step can swap implementations
//! (or mock them in tests) without touching strategy code.
use crate::models::RatingMatrix;
use crate::services::snapshot::TrainingError;

pub mod nmf;
pub mod tfidf;

pub use nmf::NmfFactorizer;
pub use tfidf::TfidfSimilarity;

/// Produces pairwise similarity between course feature documents
#[cfg_attr(test, mockall::automock)]
pub trait SimilarityProvider: Send + Sync {
    /// Returns a row-major `documents.len()` x `documents.len()` matrix.
    ///
    /// Values are expected in [0, 1] and symmetric; the snapshot checks both.
    fn similarity(&self, documents: &[String]) -> Result<Vec<f64>, TrainingError>;

    /// Provider name for logging and error messages
    fn name(&self) -> &'static str;
}

/// Completes a sparse rating matrix into dense predictions
#[cfg_attr(test, mockall::automock)]
pub trait FactorizationProvider: Send + Sync {
    /// Returns row-major predictions with the same shape as `ratings`.
    fn factorize(&self, ratings: &RatingMatrix) -> Result<Vec<f64>, TrainingError>;

    /// Provider name for logging and error messages
    fn name(&self) -> &'static str;
}
