use serde::Serialize;
use std::collections::HashMap;

use super::Dataset;
use crate::models::Difficulty;

/// Headline numbers and breakdowns for the dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetSummary {
    pub total_courses: usize,
    pub total_users: usize,
    pub total_ratings: usize,
    pub average_rating: f64,
    pub difficulty: Vec<DifficultyBreakdown>,
    pub top_instructors: Vec<InstructorCount>,
    pub top_courses: Vec<CourseRating>,
    /// Share of interactions marked completed, when the dataset records it
    pub completion_rate: Option<f64>,
    pub average_previous_courses: Option<f64>,
}

/// Per-tier aggregates over raw interactions
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DifficultyBreakdown {
    pub difficulty_level: Difficulty,
    pub interactions: usize,
    pub average_enrollment: f64,
    pub average_time_spent_hours: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InstructorCount {
    pub instructor: String,
    pub interactions: usize,
}

/// Mean rating and enrollment over every interaction with one course name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CourseRating {
    pub course_name: String,
    pub interactions: usize,
    pub average_rating: f64,
    pub average_enrollment: f64,
}

const TOP_INSTRUCTORS: usize = 10;
const TOP_COURSES: usize = 10;

#[derive(Default)]
struct Accumulator {
    count: usize,
    enrollment_sum: f64,
    time_sum: f64,
    time_count: usize,
    rating_sum: f64,
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let interactions = dataset.interactions();
        let catalog = dataset.catalog();

        let rating_sum: f64 = interactions.iter().map(|i| i.rating).sum();

        let mut tiers: HashMap<Difficulty, Accumulator> = HashMap::new();
        let mut instructors: HashMap<&str, usize> = HashMap::new();
        let mut courses: HashMap<&str, Accumulator> = HashMap::new();
        let (mut completed, mut completion_known) = (0usize, 0usize);
        let (mut previous_sum, mut previous_count) = (0u64, 0usize);

        for interaction in interactions {
            let Some(course) = catalog.get(interaction.course_id.as_str()) else {
                continue;
            };

            let tier = tiers.entry(course.difficulty_level).or_default();
            tier.count += 1;
            tier.enrollment_sum += interaction.enrollment_numbers as f64;
            if let Some(hours) = interaction.time_spent_hours {
                tier.time_sum += hours;
                tier.time_count += 1;
            }

            *instructors.entry(course.instructor.as_str()).or_insert(0) += 1;

            let named = courses.entry(course.course_name.as_str()).or_default();
            named.count += 1;
            named.rating_sum += interaction.rating;
            named.enrollment_sum += interaction.enrollment_numbers as f64;

            if let Some(done) = interaction.completed {
                completion_known += 1;
                if done {
                    completed += 1;
                }
            }
            if let Some(previous) = interaction.previous_courses_taken {
                previous_sum += u64::from(previous);
                previous_count += 1;
            }
        }

        let difficulty = Difficulty::ALL
            .iter()
            .filter_map(|level| {
                let acc = tiers.get(level)?;
                Some(DifficultyBreakdown {
                    difficulty_level: *level,
                    interactions: acc.count,
                    average_enrollment: mean(acc.enrollment_sum, acc.count).unwrap_or(0.0),
                    average_time_spent_hours: mean(acc.time_sum, acc.time_count),
                })
            })
            .collect();

        let mut top_instructors: Vec<InstructorCount> = instructors
            .into_iter()
            .map(|(instructor, interactions)| InstructorCount {
                instructor: instructor.to_string(),
                interactions,
            })
            .collect();
        top_instructors.sort_by(|a, b| {
            b.interactions
                .cmp(&a.interactions)
                .then_with(|| a.instructor.cmp(&b.instructor))
        });
        top_instructors.truncate(TOP_INSTRUCTORS);

        let mut top_courses: Vec<CourseRating> = courses
            .into_iter()
            .map(|(name, acc)| CourseRating {
                course_name: name.to_string(),
                interactions: acc.count,
                average_rating: mean(acc.rating_sum, acc.count).unwrap_or(0.0),
                average_enrollment: mean(acc.enrollment_sum, acc.count).unwrap_or(0.0),
            })
            .collect();
        top_courses.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then_with(|| a.course_name.cmp(&b.course_name))
        });
        top_courses.truncate(TOP_COURSES);

        Self {
            total_courses: catalog.len(),
            total_users: dataset.users().len(),
            total_ratings: interactions.len(),
            average_rating: mean(rating_sum, interactions.len()).unwrap_or(0.0),
            difficulty,
            top_instructors,
            top_courses,
            completion_rate: mean(completed as f64, completion_known),
            average_previous_courses: mean(previous_sum as f64, previous_count),
        }
    }
}
