// Error types for the grade fetch pipeline.

// Errors that abort a whole `fetch_grades` call.
#[derive(thiserror::Error, Debug)]
pub enum GradeFetchError {
    // A required credential was missing or blank; nothing was sent.
    #[error("missing required field: {0}")]
    MissingInput(&'static str),
    #[error("Invalid Login")]
    InvalidLogin,
    #[error("Access Denied")]
    AccessDenied,
    #[error("Session Expired")]
    SessionExpired,
    // Network failure on the login or a course detail request.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid portal url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// Row-level failures. These are logged and recorded as skipped items by the
// parsers and never escape them.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing {0} segment")]
    MissingSegment(&'static str),
    #[error("bad number {value:?} in {field}")]
    BadNumber { field: &'static str, value: String },
    #[error("expected 3 weighting cells, found {0}")]
    TooFewCells(usize),
}
