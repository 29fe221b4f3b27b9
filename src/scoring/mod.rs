pub mod engine;
pub mod error;
pub mod types;
pub mod validation;

pub use engine::{adjusted_score, classify, score, score_at};
pub use error::ScoringError;
pub use types::{Answer, Classification, ScoreResult, TraitScore};
pub use validation::{check_answer, validate_answers};
