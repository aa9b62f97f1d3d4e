// Grade report scraper for the TeachAssist student portal.
//
// Logs in through the portal's HTML form, reads the course list, then
// visits each course's detail page for assignments and category weights.

pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{GradeFetchError, RowError};
pub use models::{
    Assignment, Category, CategoryMarks, Course, GradeReport, Mark, MarkStatus, OverallMark,
    SkippedItem, Stage, WeightTable, Weighting,
};
pub use utils::assignments::{parse_assignments, parse_mark_cell};
pub use utils::courses::{parse_course_list, parse_overall_mark};
pub use utils::portal::{GradeClient, PortalSession};
pub use utils::summary::render_summary;
pub use utils::weights::parse_weight_table;

// Fetches every course for the given student from the default portal.
pub async fn fetch_grades(username: &str, password: &str) -> Result<Vec<Course>, GradeFetchError> {
    GradeClient::new().fetch_grades(username, password).await
}
