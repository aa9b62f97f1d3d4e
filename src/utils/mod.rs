pub mod assignments;
pub mod courses;
pub mod portal;
pub mod summary;
pub mod weights;

use crate::error::RowError;

// Parses a decimal number, reporting which field held the bad text.
pub(crate) fn parse_number(field: &'static str, text: &str) -> Result<f64, RowError> {
    let text = text.trim();
    text.parse::<f64>().map_err(|_| RowError::BadNumber {
        field,
        value: text.to_string(),
    })
}
