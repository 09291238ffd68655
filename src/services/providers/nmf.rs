use ndarray::Array2;

use super::FactorizationProvider;
use crate::models::RatingMatrix;
use crate::services::snapshot::TrainingError;

const EPSILON: f64 = 1e-10;

/// Non-negative matrix factorization with multiplicative updates
///
/// Approximates the user x course rating matrix `X` as `W * H` with
/// `W: users x k` and `H: k x courses`, minimizing the Frobenius error. Unrated
/// cells are treated as zero ratings, the same way the pivoted matrix stores
/// them. Initialization is seeded so training is reproducible.
#[derive(Debug, Clone)]
pub struct NmfFactorizer {
    n_components: usize,
    max_iter: usize,
    seed: u64,
}

impl Default for NmfFactorizer {
    fn default() -> Self {
        Self::new(20, 200, 42)
    }
}

impl NmfFactorizer {
    pub fn new(n_components: usize, max_iter: usize, seed: u64) -> Self {
        Self {
            n_components: n_components.max(1),
            max_iter,
            seed,
        }
    }

    /// Seeded LCG in [0, 1)
    fn pseudo_random(&self, idx: usize) -> f64 {
        let a: u64 = 1664525;
        let c: u64 = 1013904223;
        let m: u64 = 1 << 32;

        let x = a
            .wrapping_mul(self.seed.wrapping_add(idx as u64))
            .wrapping_add(c)
            % m;
        x as f64 / m as f64
    }

    /// Runs the factorization and returns `(W, H)`.
    fn fit(&self, x: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let (m, n) = x.dim();
        let k = self.n_components;
        let scale = (x.mean().unwrap_or(0.0) / k as f64).sqrt();

        let mut w = Array2::from_shape_fn((m, k), |(i, j)| {
            scale * self.pseudo_random(i * k + j) + EPSILON
        });
        let mut h = Array2::from_shape_fn((k, n), |(i, j)| {
            scale * self.pseudo_random(m * k + i * n + j) + EPSILON
        });

        for _ in 0..self.max_iter {
            // H <- H * (W^T X) / (W^T W H)
            let numerator = w.t().dot(x);
            let denominator = w.t().dot(&w).dot(&h) + EPSILON;
            h = h * &numerator / &denominator;

            // W <- W * (X H^T) / (W H H^T)
            let numerator = x.dot(&h.t());
            let denominator = w.dot(&h.dot(&h.t())) + EPSILON;
            w = w * &numerator / &denominator;
        }

        (w, h)
    }
}

impl FactorizationProvider for NmfFactorizer {
    fn factorize(&self, ratings: &RatingMatrix) -> Result<Vec<f64>, TrainingError> {
        let (m, n) = (ratings.n_users(), ratings.n_courses());
        if ratings.values.len() != m * n {
            return Err(TrainingError::Shape {
                provider: self.name(),
                expected: m * n,
                actual: ratings.values.len(),
            });
        }
        if m == 0 || n == 0 {
            return Ok(Vec::new());
        }
        let x = Array2::from_shape_vec((m, n), ratings.values.clone()).map_err(|e| {
            TrainingError::Provider {
                provider: self.name(),
                message: e.to_string(),
            }
        })?;

        let started = std::time::Instant::now();
        let (w, h) = self.fit(&x);
        let predictions: Vec<f64> = w.dot(&h).iter().copied().collect();

        tracing::debug!(
            users = m,
            courses = n,
            components = self.n_components,
            iterations = self.max_iter,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Factorization finished"
        );

        Ok(predictions)
    }

    fn name(&self) -> &'static str {
        "nmf"
    }
}
