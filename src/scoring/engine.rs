use super::error::ScoringError;
use super::types::{
    Answer, Classification, ScoreResult, TraitScore, HIGH_THRESHOLD, LOW_THRESHOLD, MAX_SCORE,
    MIN_SCORE,
};
use super::validation::check_answer;
use crate::catalog::{Catalog, Domain, Keyed};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Running sum for one domain or facet during a single scoring call.
#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    score: u32,
    count: u32,
}

impl Bucket {
    fn add(&mut self, adjusted: u32) {
        self.score += adjusted;
        self.count += 1;
    }

    /// Empty buckets produce no entry
    fn finish(self) -> Option<TraitScore> {
        (self.count > 0).then(|| TraitScore {
            score: self.score,
            count: self.count,
            result: classify(self.score, self.count),
        })
    }
}

/// Reverse-score minus-keyed items: 1<->5, 2<->4, 3 stays.
pub fn adjusted_score(keyed: Keyed, score: i64) -> i64 {
    match keyed {
        Keyed::Plus => score,
        Keyed::Minus => (MIN_SCORE + MAX_SCORE) - score,
    }
}

/// Classify a bucket by its average. Exactly 2.5 and 3.5 are neutral.
///
/// A zero count has no average and classifies as neutral; the engine never
/// produces one since empty buckets are dropped.
pub fn classify(score: u32, count: u32) -> Classification {
    if count == 0 {
        return Classification::Neutral;
    }
    let average = score as f64 / count as f64;
    if average > HIGH_THRESHOLD {
        Classification::High
    } else if average < LOW_THRESHOLD {
        Classification::Low
    } else {
        Classification::Neutral
    }
}

/// Score answers against a catalog, stamping the result with the current time.
pub fn score(catalog: &Catalog, answers: &[Answer]) -> Result<ScoreResult, ScoringError> {
    score_at(catalog, answers, Utc::now())
}

/// Score answers against a catalog with an explicit timestamp.
///
/// Every answer is range-checked before any lookup, then each one adds its
/// keying-adjusted score to its domain and (domain, facet) buckets. The first
/// invalid answer or unknown question id fails the whole call.
pub fn score_at(
    catalog: &Catalog,
    answers: &[Answer],
    generated_at: DateTime<Utc>,
) -> Result<ScoreResult, ScoringError> {
    if catalog.is_empty() {
        return Err(ScoringError::EmptyCatalog);
    }

    for (i, answer) in answers.iter().enumerate() {
        check_answer(i, answer)?;
    }

    let mut domains: BTreeMap<Domain, Bucket> = BTreeMap::new();
    let mut facets: BTreeMap<(Domain, u8), Bucket> = BTreeMap::new();

    for answer in answers {
        let question = catalog
            .get(&answer.question_id)
            .ok_or_else(|| ScoringError::UnknownQuestion(answer.question_id.clone()))?;

        // Range already checked, so the adjusted value is 1..=5
        let adjusted = adjusted_score(question.keyed, answer.score) as u32;

        domains.entry(question.domain).or_default().add(adjusted);
        facets
            .entry((question.domain, question.facet))
            .or_default()
            .add(adjusted);
    }

    let overall: BTreeMap<Domain, TraitScore> = domains
        .into_iter()
        .filter_map(|(domain, bucket)| bucket.finish().map(|s| (domain, s)))
        .collect();

    let mut facet_results: BTreeMap<Domain, BTreeMap<u8, TraitScore>> = BTreeMap::new();
    for ((domain, facet), bucket) in facets {
        if let Some(s) = bucket.finish() {
            facet_results.entry(domain).or_default().insert(facet, s);
        }
    }

    debug!(
        "Scored {} answers into {} domains and {} facets",
        answers.len(),
        overall.len(),
        facet_results.values().map(BTreeMap::len).sum::<usize>()
    );

    Ok(ScoreResult {
        overall,
        facets: facet_results,
        generated_at,
    })
}
