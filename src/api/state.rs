use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{AppError, AppResult};
use crate::services::providers::{FactorizationProvider, SimilarityProvider, TfidfSimilarity};
use crate::services::{ModelSnapshot, RecommendationSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<Arc<ModelSnapshot>>>,
    pub settings: RecommendationSettings,
    pub similarity: Arc<dyn SimilarityProvider>,
    pub factorization: Arc<dyn FactorizationProvider>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Trains the first snapshot with the providers described by `config`
    pub async fn from_config(config: &Config, dataset: Dataset) -> AppResult<Self> {
        let similarity: Arc<dyn SimilarityProvider> = Arc::new(TfidfSimilarity::english());
        let factorization: Arc<dyn FactorizationProvider> = Arc::new(config.factorizer());
        let snapshot = train(dataset, similarity.clone(), factorization.clone()).await?;

        Ok(Self {
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            settings: config.recommendation_settings(),
            similarity,
            factorization,
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// The snapshot currently serving requests
    pub async fn snapshot(&self) -> Arc<ModelSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Retrains on `dataset` and swaps the result in
    ///
    /// Requests keep reading the previous snapshot until the swap; a failed
    /// training leaves it in place.
    pub async fn retrain(&self, dataset: Dataset) -> AppResult<Arc<ModelSnapshot>> {
        let snapshot = Arc::new(
            train(dataset, self.similarity.clone(), self.factorization.clone()).await?,
        );

        let previous = {
            let mut current = self.snapshot.write().await;
            std::mem::replace(&mut *current, snapshot.clone())
        };
        tracing::info!(
            previous_snapshot = %previous.id,
            snapshot_id = %snapshot.id,
            "Snapshot swapped"
        );

        Ok(snapshot)
    }
}

/// Runs training on the blocking pool
async fn train(
    dataset: Dataset,
    similarity: Arc<dyn SimilarityProvider>,
    factorization: Arc<dyn FactorizationProvider>,
) -> AppResult<ModelSnapshot> {
    let snapshot = tokio::task::spawn_blocking(move || {
        ModelSnapshot::train(dataset, similarity.as_ref(), factorization.as_ref())
    })
    .await
    .map_err(|e| AppError::Internal(format!("Training task failed: {}", e)))??;

    Ok(snapshot)
}
