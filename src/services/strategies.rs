//! Single-signal ranking strategies.
//!
//! Every function here is a pure read over a [`ModelSnapshot`]. Rankings use
//! stable sorts, so ties keep matrix or catalog order.
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    CourseId, EmptyReason, Recommendation, RecommendationOutcome, Score, UserId,
};
use crate::services::snapshot::ModelSnapshot;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Courses most similar to `anchor`, the anchor itself excluded
pub fn content(snapshot: &ModelSnapshot, anchor: &str, top_n: usize) -> RecommendationOutcome {
    let similarity = snapshot.similarity();
    let Some(anchor_idx) = similarity.index_of(anchor) else {
        return RecommendationOutcome::Empty(EmptyReason::UnknownCourse {
            course_id: CourseId::from(anchor),
        });
    };

    let mut ranked: Vec<(usize, f64)> = similarity
        .row(anchor_idx)
        .iter()
        .copied()
        .enumerate()
        .filter(|&(idx, _)| idx != anchor_idx)
        .collect();
    ranked.sort_by(|a, b| descending(a.1, b.1));

    let catalog = snapshot.dataset().catalog();
    let entries = ranked
        .into_iter()
        .filter_map(|(idx, score)| {
            let course = catalog.get(similarity.courses()[idx].as_str())?;
            Some(Recommendation::new(course.clone(), Score::Similarity { score }))
        })
        .take(top_n)
        .collect();

    RecommendationOutcome::from_ranking(entries)
}

/// Courses with the highest predicted rating for `user`
///
/// Ranking uses the raw prediction; the reported score is clipped to the
/// rating scale.
pub fn collaborative(snapshot: &ModelSnapshot, user: &str, top_n: usize) -> RecommendationOutcome {
    let predictions = snapshot.predictions();
    let Some(row) = predictions.row(user) else {
        return RecommendationOutcome::Empty(EmptyReason::UnknownUser {
            user_id: UserId::from(user),
        });
    };

    let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| descending(a.1, b.1));

    let catalog = snapshot.dataset().catalog();
    let entries = ranked
        .into_iter()
        .filter_map(|(idx, predicted)| {
            let course = catalog.get(predictions.courses()[idx].as_str())?;
            let score = predicted.clamp(MIN_RATING, MAX_RATING);
            Some(Recommendation::new(course.clone(), Score::PredictedRating { score }))
        })
        .take(top_n)
        .collect();

    RecommendationOutcome::from_ranking(entries)
}

/// Most enrolled courses
pub fn popularity(snapshot: &ModelSnapshot, top_n: usize) -> RecommendationOutcome {
    let mut courses: Vec<_> = snapshot.dataset().catalog().courses().iter().collect();
    courses.sort_by(|a, b| b.enrollment_numbers.cmp(&a.enrollment_numbers));

    let entries = courses
        .into_iter()
        .take(top_n)
        .map(|course| {
            Recommendation::new(
                course.clone(),
                Score::Enrollment {
                    score: course.enrollment_numbers,
                },
            )
        })
        .collect();

    RecommendationOutcome::from_ranking(entries)
}

#[derive(Default)]
struct TrendAccumulator {
    enrollment_sum: f64,
    rating_sum: f64,
    count: usize,
}

/// Courses ranked by mean enrollment x mean rating over all interactions
pub fn trending(snapshot: &ModelSnapshot, top_n: usize) -> RecommendationOutcome {
    let dataset = snapshot.dataset();

    let mut order: Vec<&CourseId> = Vec::new();
    let mut groups: HashMap<&CourseId, TrendAccumulator> = HashMap::new();
    for interaction in dataset.interactions() {
        let group = groups.entry(&interaction.course_id).or_insert_with(|| {
            order.push(&interaction.course_id);
            TrendAccumulator::default()
        });
        group.enrollment_sum += interaction.enrollment_numbers as f64;
        group.rating_sum += interaction.rating;
        group.count += 1;
    }

    let mut ranked: Vec<(&CourseId, f64, f64, f64)> = order
        .into_iter()
        .filter_map(|course_id| {
            let group = groups.get(course_id)?;
            let count = group.count as f64;
            let mean_enrollment = group.enrollment_sum / count;
            let mean_rating = group.rating_sum / count;
            Some((
                course_id,
                mean_enrollment * mean_rating,
                mean_enrollment,
                mean_rating,
            ))
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.1, b.1));

    let catalog = dataset.catalog();
    let entries = ranked
        .into_iter()
        .filter_map(|(course_id, score, mean_enrollment, mean_rating)| {
            let course = catalog.get(course_id.as_str())?;
            Some(Recommendation::new(
                course.clone(),
                Score::Trend {
                    score,
                    mean_enrollment,
                    mean_rating,
                },
            ))
        })
        .take(top_n)
        .collect();

    RecommendationOutcome::from_ranking(entries)
}

/// Courses rated at or above `threshold`, best first
pub fn top_rated(snapshot: &ModelSnapshot, top_n: usize, threshold: f64) -> RecommendationOutcome {
    let mut courses: Vec<_> = snapshot
        .dataset()
        .catalog()
        .courses()
        .iter()
        .filter(|course| course.rating >= threshold)
        .collect();
    courses.sort_by(|a, b| descending(a.rating, b.rating));

    let entries = courses
        .into_iter()
        .take(top_n)
        .map(|course| Recommendation::new(course.clone(), Score::Rating { score: course.rating }))
        .collect();

    RecommendationOutcome::from_ranking(entries)
}
