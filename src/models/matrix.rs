use std::collections::HashMap;

use super::{CourseId, UserId};

/// Square course x course similarity scores, indexed in catalog order
///
/// Construction enforces the invariants every strategy relies on: exactly
/// 1.0 on the diagonal and every value inside [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    courses: Vec<CourseId>,
    index: HashMap<CourseId, usize>,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Builds the matrix from row-major values.
    ///
    /// Returns `None` when `values` is not `courses.len()` squared.
    pub fn from_row_major(courses: Vec<CourseId>, mut values: Vec<f64>) -> Option<Self> {
        let n = courses.len();
        if values.len() != n * n {
            return None;
        }

        for i in 0..n {
            for j in 0..n {
                let cell = &mut values[i * n + j];
                *cell = if i == j { 1.0 } else { (*cell).clamp(0.0, 1.0) };
            }
        }

        let index = courses
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        Some(Self {
            courses,
            index,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn courses(&self) -> &[CourseId] {
        &self.courses
    }

    pub fn index_of(&self, course_id: &str) -> Option<usize> {
        self.index.get(course_id).copied()
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        let n = self.len();
        &self.values[idx * n..(idx + 1) * n]
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i * self.len() + j])
    }
}

/// Mean observed rating per (user, course), zero where the user never rated the course
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    pub users: Vec<UserId>,
    pub courses: Vec<CourseId>,
    /// Row-major, `users.len()` x `courses.len()`
    pub values: Vec<f64>,
}

impl RatingMatrix {
    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_courses(&self) -> usize {
        self.courses.len()
    }

    pub fn get(&self, user_idx: usize, course_idx: usize) -> f64 {
        self.values[user_idx * self.n_courses() + course_idx]
    }
}

/// Dense predicted ratings, rows per user and columns per course
///
/// Values approximate the 1-5 scale but are stored unclipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedRatings {
    users: HashMap<UserId, usize>,
    courses: Vec<CourseId>,
    values: Vec<f64>,
}

impl PredictedRatings {
    /// Returns `None` when `values` does not cover every (user, course) cell.
    pub fn from_row_major(
        users: &[UserId],
        courses: Vec<CourseId>,
        values: Vec<f64>,
    ) -> Option<Self> {
        if values.len() != users.len() * courses.len() {
            return None;
        }

        let users = users
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        Some(Self {
            users,
            courses,
            values,
        })
    }

    pub fn courses(&self) -> &[CourseId] {
        &self.courses
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    /// The user's predicted rating for every course, in column order
    pub fn row(&self, user_id: &str) -> Option<&[f64]> {
        let idx = *self.users.get(user_id)?;
        let n = self.courses.len();
        Some(&self.values[idx * n..(idx + 1) * n])
    }
}
