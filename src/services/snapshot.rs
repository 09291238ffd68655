use chrono::{DateTime, Utc};
use std::time::Instant;
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::models::{CourseId, PredictedRatings, SimilarityMatrix};
use crate::services::features::build_documents;
use crate::services::providers::{FactorizationProvider, SimilarityProvider};

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Error types for model training
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("{provider} returned {actual} values, expected {expected}")]
    Shape {
        provider: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{provider} returned a non-finite value")]
    NonFinite { provider: &'static str },

    #[error("{provider} similarity is not symmetric for courses {a} and {b}")]
    Asymmetric {
        provider: &'static str,
        a: CourseId,
        b: CourseId,
    },

    #[error("{provider} failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

/// Everything one training cycle produces
///
/// A snapshot never changes after construction. Retraining builds a new one
/// and the server swaps it in whole.
#[derive(Debug)]
pub struct ModelSnapshot {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    dataset: Dataset,
    similarity: SimilarityMatrix,
    predictions: PredictedRatings,
}

impl ModelSnapshot {
    /// Builds both models from the dataset
    pub fn train(
        dataset: Dataset,
        similarity_provider: &dyn SimilarityProvider,
        factorization_provider: &dyn FactorizationProvider,
    ) -> Result<Self, TrainingError> {
        let started = Instant::now();

        let documents = build_documents(dataset.catalog());
        let values = similarity_provider.similarity(&documents)?;
        let similarity = check_similarity(similarity_provider.name(), dataset.catalog().ids(), values)?;

        let ratings = dataset.rating_matrix();
        let values = factorization_provider.factorize(&ratings)?;
        let provider = factorization_provider.name();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TrainingError::NonFinite { provider });
        }
        let expected = ratings.n_users() * ratings.n_courses();
        let actual = values.len();
        let predictions = PredictedRatings::from_row_major(&ratings.users, ratings.courses, values)
            .ok_or(TrainingError::Shape {
                provider,
                expected,
                actual,
            })?;

        let snapshot = Self::from_parts(dataset, similarity, predictions);
        tracing::info!(
            snapshot_id = %snapshot.id,
            courses = snapshot.dataset.catalog().len(),
            users = snapshot.predictions.n_users(),
            similarity = similarity_provider.name(),
            factorization = provider,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Models trained"
        );

        Ok(snapshot)
    }

    /// Assembles a snapshot from precomputed matrices
    pub fn from_parts(
        dataset: Dataset,
        similarity: SimilarityMatrix,
        predictions: PredictedRatings,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            dataset,
            similarity,
            predictions,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn predictions(&self) -> &PredictedRatings {
        &self.predictions
    }
}

fn check_similarity(
    provider: &'static str,
    courses: Vec<CourseId>,
    values: Vec<f64>,
) -> Result<SimilarityMatrix, TrainingError> {
    let n = courses.len();
    if values.len() != n * n {
        return Err(TrainingError::Shape {
            provider,
            expected: n * n,
            actual: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(TrainingError::NonFinite { provider });
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if (values[i * n + j] - values[j * n + i]).abs() > SYMMETRY_TOLERANCE {
                return Err(TrainingError::Asymmetric {
                    provider,
                    a: courses[i].clone(),
                    b: courses[j].clone(),
                });
            }
        }
    }

    SimilarityMatrix::from_row_major(courses, values).ok_or(TrainingError::Shape {
        provider,
        expected: n * n,
        actual: n * n,
    })
}
