pub mod course;
pub mod interaction;
pub mod matrix;
pub mod recommendation;

pub use course::{Course, CourseId, Difficulty};
pub use interaction::{Interaction, UserId};
pub use matrix::{PredictedRatings, RatingMatrix, SimilarityMatrix};
pub use recommendation::{EmptyReason, Recommendation, RecommendationOutcome, Score, Strategy};
