use crate::scoring::{Answer, ScoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current on-disk format version.
pub const STORE_VERSION: u32 = 1;

/// A scored assessment as kept by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub assessment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub language: String,
    pub answers: Vec<Answer>,
    pub results: ScoreResult,
    pub completed_at: DateTime<Utc>,
}

/// Versioned document holding every stored assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreState {
    pub version: u32,
    #[serde(default)]
    pub assessments: HashMap<String, AssessmentRecord>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            assessments: HashMap::new(),
        }
    }

    /// Insert or replace a record, keyed by its assessment id
    pub fn insert(&mut self, record: AssessmentRecord) {
        self.assessments
            .insert(record.assessment_id.clone(), record);
    }

    pub fn get(&self, assessment_id: &str) -> Option<&AssessmentRecord> {
        self.assessments.get(assessment_id)
    }

    /// Returns true if the assessment was present
    pub fn remove(&mut self, assessment_id: &str) -> bool {
        self.assessments.remove(assessment_id).is_some()
    }

    /// A user's assessments, newest first
    pub fn for_user(&self, user_id: &str) -> Vec<AssessmentRecord> {
        let mut records: Vec<AssessmentRecord> = self
            .assessments
            .values()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| a.assessment_id.cmp(&b.assessment_id))
        });
        records
    }
}

/// Build an assessment id of the form `assessment_<user>_<unix millis>`.
pub fn new_assessment_id(user_id: &str, now: DateTime<Utc>) -> String {
    format!("assessment_{}_{}", user_id, now.timestamp_millis())
}

/// Recover the user segment of an id built by `new_assessment_id`.
pub fn user_from_assessment_id(assessment_id: &str) -> Option<&str> {
    let rest = assessment_id.strip_prefix("assessment_")?;
    let (user, millis) = rest.rsplit_once('_')?;
    if user.is_empty() || millis.is_empty() || !millis.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(user)
}
