use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Course, CourseId, Difficulty, Recommendation, Score},
};

/// Column order of the export file
pub const EXPORT_HEADER: &[&str] = &[
    "rank",
    "course_id",
    "course_name",
    "instructor",
    "difficulty_level",
    "course_price",
    "rating",
    "enrollment_numbers",
    "score_kind",
    "score",
    "content_score",
    "collab_score",
    "mean_enrollment",
    "mean_rating",
];

/// One exported recommendation; score components are blank when the kind has none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub rank: usize,
    pub course_id: String,
    pub course_name: String,
    pub instructor: String,
    pub difficulty_level: Difficulty,
    pub course_price: f64,
    pub rating: f64,
    pub enrollment_numbers: u64,
    pub score_kind: String,
    pub score: f64,
    pub content_score: Option<f64>,
    pub collab_score: Option<f64>,
    pub mean_enrollment: Option<f64>,
    pub mean_rating: Option<f64>,
}

impl ExportRow {
    fn new(rank: usize, recommendation: &Recommendation) -> Self {
        let course = &recommendation.course;
        let (content_score, collab_score, mean_enrollment, mean_rating) =
            match recommendation.score {
                Score::Hybrid {
                    content_score,
                    collab_score,
                    ..
                } => (Some(content_score), Some(collab_score), None, None),
                Score::Trend {
                    mean_enrollment,
                    mean_rating,
                    ..
                } => (None, None, Some(mean_enrollment), Some(mean_rating)),
                _ => (None, None, None, None),
            };

        Self {
            rank,
            course_id: course.course_id.to_string(),
            course_name: course.course_name.clone(),
            instructor: course.instructor.clone(),
            difficulty_level: course.difficulty_level,
            course_price: course.course_price,
            rating: course.rating,
            enrollment_numbers: course.enrollment_numbers,
            score_kind: recommendation.score.kind().to_string(),
            score: recommendation.score.value(),
            content_score,
            collab_score,
            mean_enrollment,
            mean_rating,
        }
    }

    fn into_recommendation(self) -> AppResult<Recommendation> {
        let score = match self.score_kind.as_str() {
            "similarity" => Score::Similarity { score: self.score },
            "predicted_rating" => Score::PredictedRating { score: self.score },
            "rating" => Score::Rating { score: self.score },
            "enrollment" => Score::Enrollment {
                score: self.score as u64,
            },
            "hybrid" => Score::Hybrid {
                score: self.score,
                content_score: self.content_score.unwrap_or(0.0),
                collab_score: self.collab_score.unwrap_or(0.0),
            },
            "trend" => Score::Trend {
                score: self.score,
                mean_enrollment: self.mean_enrollment.unwrap_or(0.0),
                mean_rating: self.mean_rating.unwrap_or(0.0),
            },
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Unknown score kind '{}' at rank {}",
                    other, self.rank
                )))
            }
        };

        let course = Course {
            course_id: CourseId(self.course_id),
            course_name: self.course_name,
            instructor: self.instructor,
            difficulty_level: self.difficulty_level,
            course_price: self.course_price,
            rating: self.rating,
            enrollment_numbers: self.enrollment_numbers,
        };

        Ok(Recommendation::new(course, score))
    }
}

/// Writes a ranked list as CSV, ranks starting at 1
pub fn to_csv(recommendations: &[Recommendation]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if recommendations.is_empty() {
        writer.write_record(EXPORT_HEADER)?;
    }
    for (idx, recommendation) in recommendations.iter().enumerate() {
        writer.serialize(ExportRow::new(idx + 1, recommendation))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush export: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("Export is not UTF-8: {}", e)))
}

/// Reads an export back into recommendations, in file order
pub fn from_csv(data: &str) -> AppResult<Vec<Recommendation>> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    reader
        .deserialize::<ExportRow>()
        .map(|row| row?.into_recommendation())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::hybrid::{hybrid, HybridSettings};
    use crate::services::strategies::{self, fixtures::snapshot};

    #[test]
    fn test_header_and_blank_components() {
        let snapshot = snapshot();
        let recommendations = strategies::popularity(&snapshot, 1).into_entries();
        let csv = to_csv(&recommendations).unwrap();

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(EXPORT_HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("1,a,Course a,Emma Harris,Beginner,19.99,5.0,300,enrollment,300.0,,,,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), EXPORT_HEADER.join(","));
        assert!(from_csv(&csv).unwrap().is_empty());
    }

    #[test]
    fn test_reimport_preserves_order_and_scores() {
        let snapshot = snapshot();
        let exports = [
            hybrid(&snapshot, "u1", 4, &HybridSettings::default()).into_entries(),
            strategies::trending(&snapshot, 4).into_entries(),
            strategies::collaborative(&snapshot, "u1", 4).into_entries(),
        ];

        for recommendations in exports {
            let csv = to_csv(&recommendations).unwrap();
            let reimported = from_csv(&csv).unwrap();
            assert_eq!(reimported, recommendations);
        }
    }

    #[test]
    fn test_unknown_score_kind_is_rejected() {
        let csv = format!(
            "{}\n1,a,Course a,Emma Harris,Beginner,19.99,5.0,300,magic,1.0,,,,\n",
            EXPORT_HEADER.join(",")
        );
        assert!(matches!(from_csv(&csv), Err(AppError::InvalidInput(_))));
    }
}
