use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{CourseId, Recommendation, RecommendationOutcome, Score};
use crate::services::snapshot::ModelSnapshot;
use crate::services::strategies::{collaborative, content, MAX_RATING};

/// Blend parameters for the hybrid strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridSettings {
    pub content_weight: f64,
    pub collab_weight: f64,
    /// Each side is asked for `top_n * over_fetch_multiplier` candidates
    pub over_fetch_multiplier: usize,
}

impl Default for HybridSettings {
    fn default() -> Self {
        Self {
            content_weight: 0.4,
            collab_weight: 0.6,
            over_fetch_multiplier: 3,
        }
    }
}

#[derive(Default)]
struct Candidate {
    content_score: f64,
    collab_score: f64,
}

/// Blends content similarity around the user's favourite course with their
/// collaborative predictions.
///
/// Users without history get plain collaborative results. When only one side
/// produces candidates, that side is returned unchanged (cut to `top_n`).
pub fn hybrid(
    snapshot: &ModelSnapshot,
    user: &str,
    top_n: usize,
    settings: &HybridSettings,
) -> RecommendationOutcome {
    let Some(anchor) = favourite_course(snapshot, user) else {
        tracing::debug!(user_id = user, "No history, falling back to collaborative");
        return collaborative(snapshot, user, top_n);
    };

    let fetch = top_n.saturating_mul(settings.over_fetch_multiplier.max(1));
    let content_side = content(snapshot, anchor.as_str(), fetch);
    let collab_side = collaborative(snapshot, user, fetch);

    match (content_side.is_empty(), collab_side.is_empty()) {
        (true, true) => return collab_side,
        (true, false) => return collab_side.truncated(top_n),
        (false, true) => return content_side.truncated(top_n),
        (false, false) => {}
    }

    let content_entries = content_side.into_entries();
    let collab_entries = collab_side.into_entries();

    // Outer join on course id: content candidates first, then collaborative-only ones
    let mut order: Vec<&CourseId> = Vec::new();
    let mut candidates: HashMap<&CourseId, Candidate> = HashMap::new();

    let total = content_entries.len() as f64;
    for (rank, entry) in content_entries.iter().enumerate() {
        let candidate = candidates.entry(entry.course_id()).or_insert_with(|| {
            order.push(entry.course_id());
            Candidate::default()
        });
        candidate.content_score = (total - rank as f64) / total;
    }
    for entry in &collab_entries {
        let candidate = candidates.entry(entry.course_id()).or_insert_with(|| {
            order.push(entry.course_id());
            Candidate::default()
        });
        candidate.collab_score = entry.score.value() / MAX_RATING;
    }

    let mut ranked: Vec<(&CourseId, Score)> = order
        .into_iter()
        .filter_map(|course_id| {
            let candidate = candidates.get(course_id)?;
            let blended = settings.content_weight * candidate.content_score
                + settings.collab_weight * candidate.collab_score;
            Some((
                course_id,
                Score::Hybrid {
                    score: blended.clamp(0.0, 1.0),
                    content_score: candidate.content_score,
                    collab_score: candidate.collab_score,
                },
            ))
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.1.value()
            .partial_cmp(&a.1.value())
            .unwrap_or(Ordering::Equal)
    });

    let catalog = snapshot.dataset().catalog();
    let entries = ranked
        .into_iter()
        .filter_map(|(course_id, score)| {
            let course = catalog.get(course_id.as_str())?;
            Some(Recommendation::new(course.clone(), score))
        })
        .take(top_n)
        .collect();

    RecommendationOutcome::from_ranking(entries)
}

/// The user's highest rated course; earliest interaction wins ties
fn favourite_course<'a>(snapshot: &'a ModelSnapshot, user: &str) -> Option<&'a CourseId> {
    let mut best: Option<(&CourseId, f64)> = None;
    for interaction in snapshot.dataset().history(user) {
        match best {
            Some((_, rating)) if interaction.rating <= rating => {}
            _ => best = Some((&interaction.course_id, interaction.rating)),
        }
    }
    best.map(|(course_id, _)| course_id)
}
