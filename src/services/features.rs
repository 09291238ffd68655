use crate::dataset::Catalog;
use crate::models::Course;

/// Text representation of a course used for content similarity
pub fn combined_features(course: &Course) -> String {
    format!(
        "{} {} {}",
        course.course_name,
        course.instructor,
        course.difficulty_level.label()
    )
}

/// One feature document per catalog entry, in catalog order
pub fn build_documents(catalog: &Catalog) -> Vec<String> {
    catalog.courses().iter().map(combined_features).collect()
}
