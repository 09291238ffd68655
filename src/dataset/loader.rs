use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

use super::{Dataset, DatasetError};
use crate::models::{Course, CourseId, Difficulty, Interaction, UserId};

/// Columns every dataset must provide
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "user_id",
    "course_id",
    "course_name",
    "instructor",
    "rating",
    "difficulty_level",
    "course_price",
    "enrollment_numbers",
];

/// Raw CSV row, before range checks
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRow {
    pub user_id: String,
    pub course_id: String,
    pub course_name: String,
    pub instructor: String,
    pub rating: f64,
    pub difficulty_level: Difficulty,
    pub course_price: f64,
    pub enrollment_numbers: u64,
    #[serde(default)]
    pub time_spent_hours: Option<f64>,
    #[serde(default)]
    pub previous_courses_taken: Option<u32>,
    #[serde(default)]
    pub completion_status: Option<String>,
}

impl DatasetRow {
    /// Checks value ranges and splits the row into its course and interaction parts
    pub fn validate(self, line: u64) -> Result<(Course, Interaction), DatasetError> {
        let invalid = |message: String| DatasetError::InvalidValue { line, message };

        if self.user_id.is_empty() {
            return Err(invalid("user_id is empty".to_string()));
        }
        if self.course_id.is_empty() {
            return Err(invalid("course_id is empty".to_string()));
        }
        if !self.rating.is_finite() || !(1.0..=5.0).contains(&self.rating) {
            return Err(invalid(format!(
                "rating {} is outside the 1-5 scale",
                self.rating
            )));
        }
        if !self.course_price.is_finite() || self.course_price < 0.0 {
            return Err(invalid(format!(
                "course_price {} must be a non-negative number",
                self.course_price
            )));
        }
        if let Some(hours) = self.time_spent_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(invalid(format!(
                    "time_spent_hours {} must be a non-negative number",
                    hours
                )));
            }
        }
        let completed = match self.completion_status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_completion(raw).ok_or_else(|| {
                invalid(format!("completion_status '{}' is not recognized", raw))
            })?),
        };

        let course_id = CourseId(self.course_id);
        let course = Course {
            course_id: course_id.clone(),
            course_name: self.course_name,
            instructor: self.instructor,
            difficulty_level: self.difficulty_level,
            course_price: self.course_price,
            rating: self.rating,
            enrollment_numbers: self.enrollment_numbers,
        };
        let interaction = Interaction {
            user_id: UserId(self.user_id),
            course_id,
            rating: self.rating,
            enrollment_numbers: self.enrollment_numbers,
            time_spent_hours: self.time_spent_hours,
            previous_courses_taken: self.previous_courses_taken,
            completed,
        };

        Ok((course, interaction))
    }
}

fn parse_completion(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "completed" => Some(true),
        "0" | "false" | "no" | "not completed" | "incomplete" => Some(false),
        _ => None,
    }
}

/// Loads and validates a dataset file
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading dataset");
    let file = File::open(path)?;
    load_from_reader(file)
}

/// Loads and validates delimited text from any reader
///
/// The whole input is rejected on the first bad row; nothing is partially loaded.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(DatasetError::Header)?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        tracing::warn!(missing = ?missing, "Dataset is missing required columns");
        return Err(DatasetError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| DatasetError::Parse {
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: DatasetRow = record
            .deserialize(Some(&headers))
            .map_err(|source| DatasetError::Parse { line, source })?;
        records.push(row.validate(line)?);
    }

    let dataset = Dataset::from_records(records)?;
    tracing::info!(
        interactions = dataset.interactions().len(),
        courses = dataset.catalog().len(),
        users = dataset.users().len(),
        "Dataset loaded"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "user_id,course_id,course_name,instructor,rating,difficulty_level,course_price,enrollment_numbers";

    fn load(body: &str) -> Result<Dataset, DatasetError> {
        load_from_reader(body.as_bytes())
    }

    #[test]
    fn test_load_valid_rows() {
        let body = format!(
            "{}\n15796,9366,Python for Beginners,Emma Harris,4.5,Beginner,39.1,48245\n861,1928,Cybersecurity for Professionals,Alexander Young,4.2,Intermediate,36.3,35678\n",
            HEADER
        );
        let dataset = load(&body).unwrap();

        assert_eq!(dataset.interactions().len(), 2);
        let course = dataset.catalog().get("9366").unwrap();
        assert_eq!(course.course_name, "Python for Beginners");
        assert_eq!(course.difficulty_level, Difficulty::Beginner);
        assert_eq!(course.enrollment_numbers, 48245);
    }

    #[test]
    fn test_optional_columns() {
        let body = format!(
            "{},time_spent_hours,previous_courses_taken,completion_status,gender\n1,10,Rust,Ada,5,Advanced,10,100,12.5,3,Completed,F\n2,10,Rust,Ada,4,Advanced,10,100,,,,M\n",
            HEADER
        );
        let dataset = load(&body).unwrap();

        let first = &dataset.interactions()[0];
        assert_eq!(first.time_spent_hours, Some(12.5));
        assert_eq!(first.previous_courses_taken, Some(3));
        assert_eq!(first.completed, Some(true));

        let second = &dataset.interactions()[1];
        assert_eq!(second.time_spent_hours, None);
        assert_eq!(second.completed, None);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let body = format!("{}\n 1 , 10 ,Rust, Ada , 4.0 , beginner ,10,100\n", HEADER);
        let dataset = load(&body).unwrap();
        assert!(dataset.catalog().get("10").is_some());
        assert_eq!(dataset.users()[0].as_str(), "1");
    }

    #[test]
    fn test_missing_columns() {
        let body = "user_id,course_id,rating\n1,10,4.0\n";
        match load(body) {
            Err(DatasetError::MissingColumns(missing)) => {
                assert!(missing.contains(&"course_name".to_string()));
                assert!(missing.contains(&"enrollment_numbers".to_string()));
                assert!(!missing.contains(&"rating".to_string()));
            }
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_reports_line() {
        let body = format!(
            "{}\n1,10,Rust,Ada,4.0,Beginner,10,100\n2,11,Go,Bob,four,Beginner,10,100\n",
            HEADER
        );
        match load(&body) {
            Err(DatasetError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_rating_out_of_range() {
        let body = format!("{}\n1,10,Rust,Ada,7.5,Beginner,10,100\n", HEADER);
        assert!(matches!(
            load(&body),
            Err(DatasetError::InvalidValue { line: 2, .. })
        ));
    }

    #[test]
    fn test_negative_price() {
        let body = format!("{}\n1,10,Rust,Ada,4.0,Beginner,-1,100\n", HEADER);
        assert!(matches!(load(&body), Err(DatasetError::InvalidValue { .. })));
    }

    #[test]
    fn test_unknown_difficulty() {
        let body = format!("{}\n1,10,Rust,Ada,4.0,Expert,10,100\n", HEADER);
        assert!(matches!(load(&body), Err(DatasetError::Parse { .. })));
    }

    #[test]
    fn test_unrecognized_completion_status() {
        let body = format!(
            "{},completion_status\n1,10,Rust,Ada,4.0,Beginner,10,100,maybe\n",
            HEADER
        );
        assert!(matches!(load(&body), Err(DatasetError::InvalidValue { .. })));
    }

    #[test]
    fn test_header_only_is_empty() {
        let body = format!("{}\n", HEADER);
        assert!(matches!(load(&body), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_parse_completion() {
        assert_eq!(parse_completion("YES"), Some(true));
        assert_eq!(parse_completion("Not Completed"), Some(false));
        assert_eq!(parse_completion("0"), Some(false));
        assert_eq!(parse_completion("perhaps"), None);
    }
}
