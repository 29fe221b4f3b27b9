use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Number of facets in every domain.
pub const FACETS_PER_DOMAIN: u8 = 6;

/// Number of questions in a complete catalog (5 domains x 6 facets x 4 items).
pub const FULL_CATALOG_SIZE: usize = 120;

/// One of the five Big Five domains.
///
/// Variant order is the conventional OCEAN order and drives the ordering of
/// every map keyed by domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "O")]
    Openness,
    #[serde(rename = "C")]
    Conscientiousness,
    #[serde(rename = "E")]
    Extraversion,
    #[serde(rename = "A")]
    Agreeableness,
    #[serde(rename = "N")]
    Neuroticism,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Openness,
        Domain::Conscientiousness,
        Domain::Extraversion,
        Domain::Agreeableness,
        Domain::Neuroticism,
    ];

    /// Single-letter code ("O", "C", "E", "A", "N")
    pub fn code(&self) -> &'static str {
        match self {
            Domain::Openness => "O",
            Domain::Conscientiousness => "C",
            Domain::Extraversion => "E",
            Domain::Agreeableness => "A",
            Domain::Neuroticism => "N",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Domain::Openness => "Openness",
            Domain::Conscientiousness => "Conscientiousness",
            Domain::Extraversion => "Extraversion",
            Domain::Agreeableness => "Agreeableness",
            Domain::Neuroticism => "Neuroticism",
        }
    }

    /// Parse a domain code, case-insensitive
    pub fn from_code(s: &str) -> Option<Domain> {
        match s.trim().to_ascii_uppercase().as_str() {
            "O" => Some(Domain::Openness),
            "C" => Some(Domain::Conscientiousness),
            "E" => Some(Domain::Extraversion),
            "A" => Some(Domain::Agreeableness),
            "N" => Some(Domain::Neuroticism),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Item keying: minus-keyed items are reverse-scored before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyed {
    Plus,
    Minus,
}

/// A single catalog question.
///
/// Only `id`, `domain`, `facet` and `keyed` take part in scoring; `text` is
/// carried for display. Extra fields in catalog files are ignored so that
/// upstream question banks load as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: String,
    pub domain: Domain,
    pub facet: u8,
    pub keyed: Keyed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("question at position {0} has an empty id")]
    EmptyId(usize),

    #[error("duplicate question id '{0}'")]
    DuplicateId(String),

    #[error("question '{id}' has facet {facet}, expected 1..=6")]
    FacetOutOfRange { id: String, facet: u8 },
}

/// Question catalog for one language, keyed by question id.
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    questions: HashMap<String, QuestionSpec>,
}

/// Question counts per domain and per (domain, facet).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub domains: BTreeMap<Domain, usize>,
    pub facets: BTreeMap<Domain, BTreeMap<u8, usize>>,
}

impl Catalog {
    pub fn new(
        language: impl Into<String>,
        questions: Vec<QuestionSpec>,
    ) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(questions.len());
        for (i, q) in questions.into_iter().enumerate() {
            if q.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(i));
            }
            if q.facet < 1 || q.facet > FACETS_PER_DOMAIN {
                return Err(CatalogError::FacetOutOfRange {
                    id: q.id,
                    facet: q.facet,
                });
            }
            if map.contains_key(&q.id) {
                return Err(CatalogError::DuplicateId(q.id));
            }
            map.insert(q.id.clone(), q);
        }
        Ok(Self {
            language: language.into(),
            questions: map,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn get(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions.get(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.questions.keys().map(String::as_str).collect()
    }

    /// Questions ordered by domain, facet, then id
    pub fn questions(&self) -> Vec<&QuestionSpec> {
        let mut list: Vec<&QuestionSpec> = self.questions.values().collect();
        list.sort_by(|a, b| {
            (a.domain, a.facet, a.id.as_str()).cmp(&(b.domain, b.facet, b.id.as_str()))
        });
        list
    }

    pub fn summary(&self) -> CatalogSummary {
        let mut summary = CatalogSummary {
            total: self.questions.len(),
            ..Default::default()
        };
        for q in self.questions.values() {
            *summary.domains.entry(q.domain).or_insert(0) += 1;
            *summary
                .facets
                .entry(q.domain)
                .or_default()
                .entry(q.facet)
                .or_insert(0) += 1;
        }
        summary
    }

    /// True when both catalogs define exactly the same question ids
    pub fn same_universe(&self, other: &Catalog) -> bool {
        self.questions.len() == other.questions.len()
            && self.questions.keys().all(|id| other.questions.contains_key(id))
    }
}
