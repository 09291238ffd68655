use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{Course, CourseId, UserId};

/// Recommendation modes offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Weighted blend of content similarity and collaborative filtering
    Hybrid,
    /// Predicted ratings from the factorized user x course matrix
    Collaborative,
    /// Courses similar to an anchor course
    Content,
    /// Most enrolled courses
    Popular,
    /// Highest mean enrollment x mean rating
    Trending,
    /// Courses rated at or above the configured threshold
    TopRated,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Hybrid => "hybrid",
            Strategy::Collaborative => "collaborative",
            Strategy::Content => "content",
            Strategy::Popular => "popular",
            Strategy::Trending => "trending",
            Strategy::TopRated => "top_rated",
        };
        f.write_str(name)
    }
}

/// Score attached to a recommendation, tagged by the strategy that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Score {
    Similarity {
        score: f64,
    },
    PredictedRating {
        score: f64,
    },
    Hybrid {
        score: f64,
        content_score: f64,
        collab_score: f64,
    },
    Enrollment {
        score: u64,
    },
    Trend {
        score: f64,
        mean_enrollment: f64,
        mean_rating: f64,
    },
    Rating {
        score: f64,
    },
}

impl Score {
    /// Tag used in exports
    pub fn kind(&self) -> &'static str {
        match self {
            Score::Similarity { .. } => "similarity",
            Score::PredictedRating { .. } => "predicted_rating",
            Score::Hybrid { .. } => "hybrid",
            Score::Enrollment { .. } => "enrollment",
            Score::Trend { .. } => "trend",
            Score::Rating { .. } => "rating",
        }
    }

    /// The value the ranking was ordered by
    pub fn value(&self) -> f64 {
        match *self {
            Score::Similarity { score }
            | Score::PredictedRating { score }
            | Score::Hybrid { score, .. }
            | Score::Trend { score, .. }
            | Score::Rating { score } => score,
            Score::Enrollment { score } => score as f64,
        }
    }
}

/// A ranked course with the score that placed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub course: Course,
    pub score: Score,
}

impl Recommendation {
    pub fn new(course: Course, score: Score) -> Self {
        Self { course, score }
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course.course_id
    }
}

/// Why a strategy produced nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EmptyReason {
    UnknownUser { user_id: UserId },
    UnknownCourse { course_id: CourseId },
    NoCandidates,
}

impl Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::UnknownUser { user_id } => write!(f, "user {} has no predictions", user_id),
            EmptyReason::UnknownCourse { course_id } => {
                write!(f, "course {} is not in the catalog", course_id)
            }
            EmptyReason::NoCandidates => f.write_str("no courses matched"),
        }
    }
}

/// Result of a strategy call: a ranked list, or an explicit reason for having none
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    Ranked(Vec<Recommendation>),
    Empty(EmptyReason),
}

impl RecommendationOutcome {
    /// Wraps a computed ranking, turning an empty list into `NoCandidates`
    pub fn from_ranking(entries: Vec<Recommendation>) -> Self {
        if entries.is_empty() {
            RecommendationOutcome::Empty(EmptyReason::NoCandidates)
        } else {
            RecommendationOutcome::Ranked(entries)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RecommendationOutcome::Ranked(entries) => entries.is_empty(),
            RecommendationOutcome::Empty(_) => true,
        }
    }

    pub fn entries(&self) -> &[Recommendation] {
        match self {
            RecommendationOutcome::Ranked(entries) => entries,
            RecommendationOutcome::Empty(_) => &[],
        }
    }

    pub fn into_entries(self) -> Vec<Recommendation> {
        match self {
            RecommendationOutcome::Ranked(entries) => entries,
            RecommendationOutcome::Empty(_) => Vec::new(),
        }
    }

    /// Keeps at most `n` entries
    pub fn truncated(self, n: usize) -> Self {
        match self {
            RecommendationOutcome::Ranked(mut entries) => {
                entries.truncate(n);
                RecommendationOutcome::from_ranking(entries)
            }
            empty => empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    fn course(id: &str) -> Course {
        Course {
            course_id: CourseId::from(id),
            course_name: format!("Course {}", id),
            instructor: "Emma Harris".to_string(),
            difficulty_level: Difficulty::Beginner,
            course_price: 39.1,
            rating: 4.5,
            enrollment_numbers: 48245,
        }
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&Strategy::TopRated).unwrap();
        assert_eq!(json, "\"top_rated\"");

        let parsed: Strategy = serde_json::from_str("\"collaborative\"").unwrap();
        assert_eq!(parsed, Strategy::Collaborative);
        assert_eq!(Strategy::TopRated.to_string(), "top_rated");
    }

    #[test]
    fn test_score_is_tagged_by_kind() {
        let score = Score::Hybrid {
            score: 0.76,
            content_score: 1.0,
            collab_score: 0.6,
        };
        let json = serde_json::to_value(score).unwrap();
        assert_eq!(json["kind"], "hybrid");
        assert_eq!(json["content_score"], 1.0);
        assert_eq!(score.kind(), "hybrid");
        assert_eq!(score.value(), 0.76);
    }

    #[test]
    fn test_enrollment_score_value() {
        let score = Score::Enrollment { score: 1200 };
        assert_eq!(score.value(), 1200.0);
        assert_eq!(score.kind(), "enrollment");
    }

    #[test]
    fn test_recommendation_flattens_course() {
        let rec = Recommendation::new(course("9366"), Score::Rating { score: 4.5 });
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["course_id"], "9366");
        assert_eq!(json["difficulty_level"], "Beginner");
        assert_eq!(json["score"]["kind"], "rating");
    }

    #[test]
    fn test_outcome_from_empty_ranking() {
        let outcome = RecommendationOutcome::from_ranking(vec![]);
        assert_eq!(outcome, RecommendationOutcome::Empty(EmptyReason::NoCandidates));
        assert!(outcome.is_empty());
        assert!(outcome.entries().is_empty());
    }

    #[test]
    fn test_outcome_truncation() {
        let entries = vec![
            Recommendation::new(course("1"), Score::Rating { score: 5.0 }),
            Recommendation::new(course("2"), Score::Rating { score: 4.9 }),
            Recommendation::new(course("3"), Score::Rating { score: 4.8 }),
        ];
        let outcome = RecommendationOutcome::Ranked(entries).truncated(2);
        let ids: Vec<&str> = outcome.entries().iter().map(|r| r.course_id().as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_reason_serialization() {
        let reason = EmptyReason::UnknownUser {
            user_id: UserId::from("15796"),
        };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["reason"], "unknown_user");
        assert_eq!(json["user_id"], "15796");
    }
}
