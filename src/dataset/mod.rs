//! Interaction dataset and the unique-course view derived from it.
//!
//! The loader validates every row at the boundary, so the strategies never see
//! a missing field or an out-of-range rating.

pub mod loader;
pub mod summary;

use std::collections::HashMap;

use crate::models::{Course, CourseId, Interaction, RatingMatrix, UserId};

pub use loader::{load_from_path, load_from_reader, DatasetRow, REQUIRED_COLUMNS};
pub use summary::DatasetSummary;

/// Error types for dataset loading
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read header row: {0}")]
    Header(#[source] csv::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Line {line}: {source}")]
    Parse { line: u64, source: csv::Error },

    #[error("Line {line}: {message}")]
    InvalidValue { line: u64, message: String },

    #[error("Dataset contains no interactions")]
    Empty,
}

/// One course per course id, in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
    index: HashMap<CourseId, usize>,
}

impl Catalog {
    /// Inserts the course unless its id is already present; first occurrence wins.
    fn insert_first(&mut self, course: Course) {
        if self.index.contains_key(&course.course_id) {
            return;
        }
        self.index
            .insert(course.course_id.clone(), self.courses.len());
        self.courses.push(course);
    }

    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.index.get(course_id).map(|&idx| &self.courses[idx])
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn ids(&self) -> Vec<CourseId> {
        self.courses.iter().map(|c| c.course_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Validated interaction table with its derived views
#[derive(Debug, Clone)]
pub struct Dataset {
    interactions: Vec<Interaction>,
    catalog: Catalog,
    users: Vec<UserId>,
    histories: HashMap<UserId, Vec<usize>>,
}

impl Dataset {
    /// Builds the dataset from validated (course, interaction) pairs in file order.
    pub fn from_records(
        records: impl IntoIterator<Item = (Course, Interaction)>,
    ) -> Result<Self, DatasetError> {
        let mut interactions = Vec::new();
        let mut catalog = Catalog::default();
        let mut users = Vec::new();
        let mut histories: HashMap<UserId, Vec<usize>> = HashMap::new();

        for (course, interaction) in records {
            catalog.insert_first(course);

            let position = interactions.len();
            match histories.get_mut(&interaction.user_id) {
                Some(history) => history.push(position),
                None => {
                    users.push(interaction.user_id.clone());
                    histories.insert(interaction.user_id.clone(), vec![position]);
                }
            }
            interactions.push(interaction);
        }

        if interactions.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(Self {
            interactions,
            catalog,
            users,
            histories,
        })
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Users in order of first appearance
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// The user's interactions in file order; empty for unknown users
    pub fn history<'a>(&'a self, user_id: &str) -> impl Iterator<Item = &'a Interaction> + 'a {
        self.histories
            .get(user_id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.interactions[idx])
    }

    /// Pivots interactions into a user x course matrix of mean ratings.
    ///
    /// Rows follow `users()`, columns follow catalog order, unrated cells are 0.
    pub fn rating_matrix(&self) -> RatingMatrix {
        let n_courses = self.catalog.len();
        let user_index: HashMap<&UserId, usize> =
            self.users.iter().enumerate().map(|(i, u)| (u, i)).collect();

        let mut sums = vec![0.0; self.users.len() * n_courses];
        let mut counts = vec![0u32; self.users.len() * n_courses];

        for interaction in &self.interactions {
            let (Some(&u), Some(&c)) = (
                user_index.get(&interaction.user_id),
                self.catalog.index.get(&interaction.course_id),
            ) else {
                continue;
            };
            sums[u * n_courses + c] += interaction.rating;
            counts[u * n_courses + c] += 1;
        }

        let values = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| if count == 0 { 0.0 } else { sum / count as f64 })
            .collect();

        RatingMatrix {
            users: self.users.clone(),
            courses: self.catalog.ids(),
            values,
        }
    }
}
