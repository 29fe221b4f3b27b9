//! JSON shapes exchanged with callers: score requests read from disk and the
//! responses printed with `--format json`.

use crate::scoring::{validate_answers, Answer, ScoreResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub assessment_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub answers: Vec<Answer>,
}

/// A request file is either a full request object or a bare answer list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Full(ScoreRequest),
    Bare(Vec<Answer>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub assessment_id: String,
    pub results: ScoreResult,
    pub status: String,
    pub language: String,
    pub answers_processed: usize,
}

impl ScoreResponse {
    pub fn completed(
        assessment_id: String,
        language: String,
        results: ScoreResult,
        answers_processed: usize,
    ) -> Self {
        Self {
            assessment_id,
            results,
            status: "completed".to_string(),
            language,
            answers_processed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,
    pub answers_count: usize,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Parse a request body from JSON text
pub fn parse_request(content: &str) -> Result<ScoreRequest> {
    let parsed: RequestFile = serde_json::from_str(content)
        .context("answers must be an array of {questionId, score} objects")?;
    Ok(match parsed {
        RequestFile::Full(request) => request,
        RequestFile::Bare(answers) => ScoreRequest {
            assessment_id: None,
            user_id: None,
            language: None,
            answers,
        },
    })
}

/// Read and parse a request file
pub fn load_request(path: &Path) -> Result<ScoreRequest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file at {}", path.display()))?;
    parse_request(&content).with_context(|| format!("Invalid request in {}", path.display()))
}

/// Validate request shape and answer ranges without a catalog.
/// Returns all validation errors at once (not just the first).
pub fn validate_request(request: &ScoreRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref id) = request.assessment_id {
        if id.trim().is_empty() {
            errors.push("assessmentId: must not be empty".to_string());
        }
    }

    if let Err(answer_errors) = validate_answers(&request.answers) {
        errors.extend(answer_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
