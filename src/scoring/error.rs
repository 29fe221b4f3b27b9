use thiserror::Error;

/// Errors from a scoring call. Any error means no result was produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// Malformed answer (score out of range, missing question id)
    #[error("Invalid answer at position {index}: {message}")]
    Validation { index: usize, message: String },

    /// Answer references a question the catalog does not define
    #[error("Question {0} not found")]
    UnknownQuestion(String),

    /// Catalog has no questions
    #[error("Question catalog is empty")]
    EmptyCatalog,
}

impl ScoringError {
    /// Errors caused by the caller's data (the 4xx class). Everything else is
    /// internal.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScoringError::Validation { .. } | ScoringError::UnknownQuestion(_)
        )
    }
}
