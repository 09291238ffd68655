use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{RecommendationOutcome, Strategy},
    services::{
        hybrid::{hybrid, HybridSettings},
        snapshot::ModelSnapshot,
        strategies,
    },
};

/// A recommendation query as clients send it
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub strategy: Strategy,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl RecommendationRequest {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            user_id: None,
            course_id: None,
            top_n: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    fn user(&self) -> Option<&str> {
        non_blank(self.user_id.as_deref())
    }

    fn course(&self) -> Option<&str> {
        non_blank(self.course_id.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Tunables the dispatcher applies to every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSettings {
    pub hybrid: HybridSettings,
    pub top_rated_threshold: f64,
    pub default_top_n: usize,
    pub max_top_n: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            hybrid: HybridSettings::default(),
            top_rated_threshold: 4.5,
            default_top_n: 10,
            max_top_n: 100,
        }
    }
}

/// Validates the request and routes it to its strategy
///
/// Missing identifiers and out-of-range `top_n` are request errors. Unknown
/// identifiers are not: they come back as an empty outcome with a reason.
pub fn recommend(
    snapshot: &ModelSnapshot,
    request: &RecommendationRequest,
    settings: &RecommendationSettings,
) -> AppResult<RecommendationOutcome> {
    let top_n = request.top_n.unwrap_or(settings.default_top_n);
    if top_n == 0 || top_n > settings.max_top_n {
        return Err(AppError::InvalidInput(format!(
            "top_n must be between 1 and {}, got {}",
            settings.max_top_n, top_n
        )));
    }

    let outcome = match request.strategy {
        Strategy::Content => {
            let course = request.course().ok_or_else(|| missing("course_id", request.strategy))?;
            strategies::content(snapshot, course, top_n)
        }
        Strategy::Collaborative => {
            let user = request.user().ok_or_else(|| missing("user_id", request.strategy))?;
            strategies::collaborative(snapshot, user, top_n)
        }
        Strategy::Hybrid => match (request.user(), request.course()) {
            (Some(user), _) => hybrid(snapshot, user, top_n, &settings.hybrid),
            // Only a course selected: answer with courses similar to it
            (None, Some(course)) => strategies::content(snapshot, course, top_n),
            (None, None) => {
                return Err(AppError::InvalidInput(
                    "hybrid recommendations need a user_id or a course_id".to_string(),
                ))
            }
        },
        Strategy::Popular => strategies::popularity(snapshot, top_n),
        Strategy::Trending => strategies::trending(snapshot, top_n),
        Strategy::TopRated => strategies::top_rated(snapshot, top_n, settings.top_rated_threshold),
    };

    match &outcome {
        RecommendationOutcome::Ranked(entries) => tracing::info!(
            strategy = %request.strategy,
            top_n,
            returned = entries.len(),
            "Recommendations computed"
        ),
        RecommendationOutcome::Empty(reason) => tracing::info!(
            strategy = %request.strategy,
            top_n,
            reason = %reason,
            "No recommendations"
        ),
    }

    Ok(outcome)
}

fn missing(parameter: &str, strategy: Strategy) -> AppError {
    AppError::InvalidInput(format!("{} recommendations need a {}", strategy, parameter))
}
