use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt::Display};

use super::CourseId;

/// Identifier for a learner as it appears in the dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for UserId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A single rating event from the raw dataset
///
/// Interactions are kept exactly as loaded, one per row, so a course shows up
/// once per rating it received.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Interaction {
    pub user_id: UserId,
    pub course_id: CourseId,
    /// Rating on the 1-5 scale
    pub rating: f64,
    /// Enrollment figure carried by this row
    pub enrollment_numbers: u64,
    pub time_spent_hours: Option<f64>,
    pub previous_courses_taken: Option<u32>,
    pub completed: Option<bool>,
}
