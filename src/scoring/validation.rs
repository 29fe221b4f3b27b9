use super::error::ScoringError;
use super::types::{Answer, MAX_SCORE, MIN_SCORE};

/// Check a single answer's shape and range.
pub fn check_answer(index: usize, answer: &Answer) -> Result<(), ScoringError> {
    if answer.question_id.trim().is_empty() {
        return Err(ScoringError::Validation {
            index,
            message: "questionId is required".to_string(),
        });
    }
    if answer.score < MIN_SCORE || answer.score > MAX_SCORE {
        return Err(ScoringError::Validation {
            index,
            message: format!(
                "score must be between {} and {}, got {}",
                MIN_SCORE, MAX_SCORE, answer.score
            ),
        });
    }
    Ok(())
}

/// Validate answers without a catalog.
/// Returns all validation errors at once (not just the first).
pub fn validate_answers(answers: &[Answer]) -> Result<(), Vec<String>> {
    let errors: Vec<String> = answers
        .iter()
        .enumerate()
        .filter_map(|(i, answer)| check_answer(i, answer).err())
        .map(|e| match e {
            ScoringError::Validation { index, message } => {
                format!("answers[{}]: {}", index, message)
            }
            other => other.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
