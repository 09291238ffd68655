use serde::Deserialize;

use crate::services::hybrid::HybridSettings;
use crate::services::providers::NmfFactorizer;
use crate::services::recommendations::RecommendationSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Interaction dataset loaded at startup
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Weight of the rank-based content score in the hybrid blend
    #[serde(default = "default_content_weight")]
    pub hybrid_content_weight: f64,

    /// Weight of the normalized predicted rating in the hybrid blend
    #[serde(default = "default_collab_weight")]
    pub hybrid_collab_weight: f64,

    /// How many candidates per requested slot the hybrid path pulls from each side
    #[serde(default = "default_over_fetch_multiplier")]
    pub over_fetch_multiplier: usize,

    /// Minimum course rating for the top-rated strategy
    #[serde(default = "default_top_rated_threshold")]
    pub top_rated_threshold: f64,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,

    /// Latent factors used by the rating factorization
    #[serde(default = "default_nmf_components")]
    pub nmf_components: usize,

    #[serde(default = "default_nmf_max_iter")]
    pub nmf_max_iter: usize,

    #[serde(default = "default_nmf_seed")]
    pub nmf_seed: u64,

    /// Body limit for dataset uploads
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_dataset_path() -> String {
    "data/processed_courses.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_content_weight() -> f64 {
    0.4
}

fn default_collab_weight() -> f64 {
    0.6
}

fn default_over_fetch_multiplier() -> usize {
    3
}

fn default_top_rated_threshold() -> f64 {
    4.5
}

fn default_top_n() -> usize {
    10
}

fn default_max_top_n() -> usize {
    100
}

fn default_nmf_components() -> usize {
    20
}

fn default_nmf_max_iter() -> usize {
    200
}

fn default_nmf_seed() -> u64 {
    42
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            host: default_host(),
            port: default_port(),
            hybrid_content_weight: default_content_weight(),
            hybrid_collab_weight: default_collab_weight(),
            over_fetch_multiplier: default_over_fetch_multiplier(),
            top_rated_threshold: default_top_rated_threshold(),
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
            nmf_components: default_nmf_components(),
            nmf_max_iter: default_nmf_max_iter(),
            nmf_seed: default_nmf_seed(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would break the score ranges or the request bounds
    pub fn validate(&self) -> anyhow::Result<()> {
        let weights = [self.hybrid_content_weight, self.hybrid_collab_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0 || *w > 1.0) {
            anyhow::bail!(
                "Hybrid weights must lie in [0, 1], got content={} collab={}",
                self.hybrid_content_weight,
                self.hybrid_collab_weight
            );
        }
        if self.hybrid_content_weight + self.hybrid_collab_weight > 1.0 + 1e-9 {
            anyhow::bail!(
                "Hybrid weights must not sum above 1, got {}",
                self.hybrid_content_weight + self.hybrid_collab_weight
            );
        }
        if self.over_fetch_multiplier == 0 {
            anyhow::bail!("OVER_FETCH_MULTIPLIER must be at least 1");
        }
        if !self.top_rated_threshold.is_finite() {
            anyhow::bail!("TOP_RATED_THRESHOLD must be a finite number");
        }
        if self.max_top_n == 0 || self.default_top_n == 0 || self.default_top_n > self.max_top_n {
            anyhow::bail!(
                "DEFAULT_TOP_N must lie in 1..={}, got {}",
                self.max_top_n,
                self.default_top_n
            );
        }
        if self.nmf_components == 0 {
            anyhow::bail!("NMF_COMPONENTS must be at least 1");
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn hybrid_settings(&self) -> HybridSettings {
        HybridSettings {
            content_weight: self.hybrid_content_weight,
            collab_weight: self.hybrid_collab_weight,
            over_fetch_multiplier: self.over_fetch_multiplier,
        }
    }

    pub fn recommendation_settings(&self) -> RecommendationSettings {
        RecommendationSettings {
            hybrid: self.hybrid_settings(),
            top_rated_threshold: self.top_rated_threshold,
            default_top_n: self.default_top_n,
            max_top_n: self.max_top_n,
        }
    }

    pub fn factorizer(&self) -> NmfFactorizer {
        NmfFactorizer::new(self.nmf_components, self.nmf_max_iter, self.nmf_seed)
    }
}
