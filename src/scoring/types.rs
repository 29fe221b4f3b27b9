use crate::catalog::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest and highest valid Likert responses.
pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

/// Averages above this classify as high.
pub const HIGH_THRESHOLD: f64 = 3.5;
/// Averages below this classify as low.
pub const LOW_THRESHOLD: f64 = 2.5;

/// One Likert response. `score` is kept wide so out-of-range input reaches
/// validation instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub score: i64,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, score: i64) -> Self {
        Self {
            question_id: question_id.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Low,
    Neutral,
    High,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Low => "low",
            Classification::Neutral => "neutral",
            Classification::High => "high",
        }
    }
}

/// Aggregate for one domain or facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitScore {
    /// Sum of keying-adjusted scores
    pub score: u32,
    pub count: u32,
    pub result: Classification,
}

impl TraitScore {
    /// Mean adjusted score; None for a zero count
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.score as f64 / self.count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub overall: BTreeMap<Domain, TraitScore>,
    pub facets: BTreeMap<Domain, BTreeMap<u8, TraitScore>>,
    pub generated_at: DateTime<Utc>,
}

impl ScoreResult {
    /// True when no answer contributed to any bucket
    pub fn is_empty(&self) -> bool {
        self.overall.is_empty()
    }
}
