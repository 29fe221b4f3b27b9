use std::collections::BTreeSet;
use std::io::IsTerminal;
use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::catalog::{Catalog, CatalogSummary, ConsistencyReport, Domain, Keyed};
use crate::scoring::{Classification, ScoreResult, TraitScore};
use crate::store::AssessmentRecord;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Classification label, padded to 7 chars and colored when enabled
pub fn format_classification(result: Classification, use_colors: bool) -> String {
    let label = format!("{:<7}", result.as_str());
    if !use_colors {
        return label;
    }
    match result {
        Classification::High => label.green().to_string(),
        Classification::Low => label.red().to_string(),
        Classification::Neutral => label.yellow().to_string(),
    }
}

/// One aligned line: label, sum, count, average, classification
fn format_trait_line(label: &str, score: &TraitScore, use_colors: bool) -> String {
    let average = match score.average() {
        Some(avg) => format!("{:.2}", avg),
        None => "-".to_string(),
    };
    format!(
        "{:<22}{:>5}{:>7}{:>7}  {}",
        label,
        score.score,
        score.count,
        average,
        format_classification(score.result, use_colors)
    )
}

/// Format a score result as a table: each domain followed by its facets.
pub fn format_result(result: &ScoreResult, use_colors: bool) -> String {
    if result.is_empty() {
        return "No answers scored.".to_string();
    }

    let header = format!(
        "{:<22}{:>5}{:>7}{:>7}  {}",
        "Domain", "Score", "Count", "Avg", "Result"
    );
    let mut lines = vec![if use_colors {
        header.dimmed().to_string()
    } else {
        header
    }];

    for (domain, score) in &result.overall {
        let label = format!("{} {}", domain.code(), domain.name());
        let line = format_trait_line(&label, score, use_colors);
        lines.push(if use_colors {
            line.bold().to_string()
        } else {
            line
        });

        if let Some(facets) = result.facets.get(domain) {
            for (facet, facet_score) in facets {
                let label = format!("  facet {}", facet);
                lines.push(format_trait_line(&label, facet_score, use_colors));
            }
        }
    }

    lines.join("\n")
}

/// Compact "O:high C:low ..." summary of a result's domains
pub fn format_domain_summary(result: &ScoreResult) -> String {
    result
        .overall
        .iter()
        .map(|(domain, score)| format!("{}:{}", domain.code(), score.result.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format stored assessments one per line, newest first as given
pub fn format_history(records: &[AssessmentRecord], use_colors: bool) -> String {
    if records.is_empty() {
        return "No assessments found.".to_string();
    }

    records
        .iter()
        .map(|record| {
            let age = format_age(Utc::now() - record.completed_at);
            let summary = format_domain_summary(&record.results);
            if use_colors {
                format!(
                    "{}  {:>4}  {}  {}",
                    record.assessment_id.cyan(),
                    age.dimmed(),
                    record.language,
                    summary
                )
            } else {
                format!(
                    "{}  {:>4}  {}  {}",
                    record.assessment_id, age, record.language, summary
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "sum/count", or "-" when the assessment has no entry
fn compare_cell(score: Option<&TraitScore>) -> String {
    match score {
        Some(score) => format!("{}/{}", score.score, score.count),
        None => "-".to_string(),
    }
}

/// Side-by-side domain scores for several assessments, each domain followed
/// by its facets. Cells show "sum/count"; entries an assessment did not cover
/// show "-".
pub fn format_compare(records: &[AssessmentRecord], use_colors: bool) -> String {
    if records.is_empty() {
        return "No assessments to compare.".to_string();
    }

    let column_width = 12;
    let mut header = format!("{:<20}", "Domain");
    for (i, record) in records.iter().enumerate() {
        let label = record
            .user_id
            .clone()
            .unwrap_or_else(|| format!("#{}", i + 1));
        header.push_str(&format!(
            "{:>width$}",
            truncate_text(&label, column_width - 1),
            width = column_width
        ));
    }

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for domain in Domain::ALL {
        if records
            .iter()
            .all(|r| !r.results.overall.contains_key(&domain))
        {
            continue;
        }
        let mut line = format!("{:<20}", format!("{} {}", domain.code(), domain.name()));
        for record in records {
            let cell = compare_cell(record.results.overall.get(&domain));
            line.push_str(&format!("{:>width$}", cell, width = column_width));
        }
        lines.push(if use_colors {
            line.bold().to_string()
        } else {
            line
        });

        let facets: BTreeSet<u8> = records
            .iter()
            .filter_map(|r| r.results.facets.get(&domain))
            .flat_map(|f| f.keys().copied())
            .collect();
        for facet in facets {
            let mut line = format!("{:<20}", format!("  facet {}", facet));
            for record in records {
                let score = record
                    .results
                    .facets
                    .get(&domain)
                    .and_then(|f| f.get(&facet));
                line.push_str(&format!(
                    "{:>width$}",
                    compare_cell(score),
                    width = column_width
                ));
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Question counts per domain and facet
pub fn format_catalog_summary(language: &str, summary: &CatalogSummary) -> String {
    let mut lines = vec![format!("Catalog '{}': {} questions", language, summary.total)];
    for (domain, count) in &summary.domains {
        let facets = summary
            .facets
            .get(domain)
            .map(|f| {
                f.iter()
                    .map(|(facet, n)| format!("{}:{}", facet, n))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        lines.push(format!(
            "  {} {:<18}{:>4}  facets {}",
            domain.code(),
            domain.name(),
            count,
            facets
        ));
    }
    lines.join("\n")
}

/// List questions as "id  domain+facet  keyed  text", truncating text to the terminal
pub fn format_questions(catalog: &Catalog, use_colors: bool) -> String {
    if catalog.is_empty() {
        return "No questions in catalog.".to_string();
    }

    let term_width = get_terminal_width();

    catalog
        .questions()
        .iter()
        .map(|q| {
            let keyed = match q.keyed {
                Keyed::Plus => "+",
                Keyed::Minus => "-",
            };
            let prefix = format!("{}  {}{}  {}", q.id, q.domain.code(), q.facet, keyed);
            let text = q.text.as_deref().unwrap_or("");
            let text = match term_width {
                Some(width) if width > prefix.chars().count() + 12 => {
                    truncate_text(text, width - prefix.chars().count() - 2)
                }
                Some(_) => truncate_text(text, 10),
                None => text.to_string(),
            };
            if use_colors {
                format!("{}  {}", prefix.dimmed(), text)
            } else {
                format!("{}  {}", prefix, text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Report from a cross-language catalog check
pub fn format_consistency(report: &ConsistencyReport) -> String {
    let mut lines = vec![format!("Languages: {}", report.languages.join(", "))];
    for (language, count) in &report.incomplete {
        lines.push(format!("  {}: {} questions (incomplete)", language, count));
    }
    if report.is_consistent() {
        lines.push("All catalogs share the same question ids.".to_string());
    } else {
        lines.push(format!(
            "Question ids differ from the fallback catalog in: {}",
            report.mismatched.join(", ")
        ));
    }
    lines.join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QuestionSpec;
    use crate::scoring::Answer;
    use std::collections::BTreeMap;

    fn trait_score(score: u32, count: u32, result: Classification) -> TraitScore {
        TraitScore { score, count, result }
    }

    fn sample_result() -> ScoreResult {
        let o = trait_score(9, 2, Classification::High);
        let n = trait_score(2, 1, Classification::Low);
        ScoreResult {
            overall: BTreeMap::from([(Domain::Openness, o), (Domain::Neuroticism, n)]),
            facets: BTreeMap::from([
                (
                    Domain::Openness,
                    BTreeMap::from([
                        (1u8, trait_score(5, 1, Classification::High)),
                        (3u8, trait_score(4, 1, Classification::High)),
                    ]),
                ),
                (Domain::Neuroticism, BTreeMap::from([(2u8, n)])),
            ]),
            generated_at: Utc::now(),
        }
    }

    fn sample_record(id: &str, user: Option<&str>, result: ScoreResult) -> AssessmentRecord {
        AssessmentRecord {
            assessment_id: id.to_string(),
            user_id: user.map(str::to_string),
            language: "en".to_string(),
            answers: vec![Answer::new("q1", 4)],
            results: result,
            completed_at: Utc::now() - Duration::hours(3),
        }
    }

    #[test]
    fn test_format_result_empty() {
        let result = ScoreResult {
            overall: BTreeMap::new(),
            facets: BTreeMap::new(),
            generated_at: Utc::now(),
        };
        assert_eq!(format_result(&result, false), "No answers scored.");
    }

    #[test]
    fn test_format_result_table() {
        let output = format_result(&sample_result(), false);
        let lines: Vec<&str> = output.lines().collect();
        // header, O, two O facets, N, one N facet
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Domain"));
        assert!(lines[1].starts_with("O Openness"));
        assert!(lines[1].contains("4.50"));
        assert!(lines[1].contains("high"));
        assert!(lines[2].starts_with("  facet 1"));
        assert!(lines[3].starts_with("  facet 3"));
        assert!(lines[4].starts_with("N Neuroticism"));
        assert!(lines[4].contains("low"));
    }

    #[test]
    fn test_format_classification_plain() {
        assert_eq!(format_classification(Classification::High, false), "high   ");
        assert_eq!(format_classification(Classification::Neutral, false), "neutral");
    }

    #[test]
    fn test_format_domain_summary() {
        assert_eq!(format_domain_summary(&sample_result()), "O:high N:low");
    }

    #[test]
    fn test_format_history() {
        let records = vec![sample_record("assessment_alice_1", Some("alice"), sample_result())];
        let output = format_history(&records, false);
        assert!(output.contains("assessment_alice_1"));
        assert!(output.contains("3h"));
        assert!(output.contains("O:high N:low"));
        assert_eq!(format_history(&[], false), "No assessments found.");
    }

    #[test]
    fn test_format_compare() {
        let mut other = sample_result();
        other.overall.remove(&Domain::Neuroticism);
        other.facets.remove(&Domain::Neuroticism);
        other
            .facets
            .get_mut(&Domain::Openness)
            .unwrap()
            .remove(&3);
        let records = vec![
            sample_record("a1", Some("alice"), sample_result()),
            sample_record("a2", None, other),
        ];
        let output = format_compare(&records, false);
        let lines: Vec<&str> = output.lines().collect();
        // header, O, O facets 1 and 3, N, N facet 2
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("alice"));
        assert!(lines[0].contains("#2"));
        assert!(lines[1].starts_with("O Openness"));
        assert!(lines[1].contains("9/2"));

        assert!(lines[2].starts_with("  facet 1"));
        let cells: Vec<&str> = lines[2].split_whitespace().skip(2).collect();
        assert_eq!(cells, vec!["5/1", "5/1"]);

        assert!(lines[3].starts_with("  facet 3"));
        let cells: Vec<&str> = lines[3].split_whitespace().skip(2).collect();
        assert_eq!(cells, vec!["4/1", "-"]);

        assert!(lines[4].starts_with("N Neuroticism"));
        assert!(lines[4].trim_end().ends_with('-'));
        assert!(lines[5].starts_with("  facet 2"));
        let cells: Vec<&str> = lines[5].split_whitespace().skip(2).collect();
        assert_eq!(cells, vec!["2/1", "-"]);
    }

    #[test]
    fn test_format_result_zero_count_shows_dash() {
        let empty = trait_score(0, 0, Classification::Neutral);
        let line = format_trait_line("O Openness", &empty, false);
        assert!(!line.contains("NaN"));
        assert!(line.contains(" -  "));
    }

    #[test]
    fn test_format_catalog_summary() {
        let catalog = Catalog::new(
            "en",
            vec![
                QuestionSpec {
                    id: "q1".to_string(),
                    domain: Domain::Openness,
                    facet: 1,
                    keyed: Keyed::Plus,
                    text: None,
                },
                QuestionSpec {
                    id: "q2".to_string(),
                    domain: Domain::Openness,
                    facet: 2,
                    keyed: Keyed::Minus,
                    text: Some("Avoid philosophical discussions".to_string()),
                },
            ],
        )
        .unwrap();
        let output = format_catalog_summary("en", &catalog.summary());
        assert!(output.starts_with("Catalog 'en': 2 questions"));
        assert!(output.contains("facets 1:1 2:1"));

        let listing = format_questions(&catalog, false);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("q1  O1  +"));
        assert!(lines[1].starts_with("q2  O2  -"));
    }

    #[test]
    fn test_format_consistency() {
        let report = ConsistencyReport {
            languages: vec!["de".to_string(), "en".to_string()],
            mismatched: vec!["de".to_string()],
            incomplete: vec![],
        };
        let output = format_consistency(&report);
        assert!(output.contains("Languages: de, en"));
        assert!(output.contains("differ from the fallback catalog in: de"));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Short", 20), "Short");
        assert_eq!(truncate_text("This is a very long text", 15), "This is a ve...");
        assert_eq!(truncate_text("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::weeks(2)), "2w");
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::seconds(30)), "now");
    }
}
