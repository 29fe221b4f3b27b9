use super::types::{Catalog, FULL_CATALOG_SIZE, QuestionSpec};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Language used when the requested one has no catalog file.
pub const FALLBACK_LANGUAGE: &str = "en";

/// True for codes like "en", "pt-br" or "zh_CN": non-empty ASCII
/// alphanumerics, `-` and `_`. Anything else could name a path outside the
/// catalog directory.
pub fn is_valid_language_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Source of question catalogs, one per language code.
///
/// Implementations must return the same id set for every language; only
/// display text may differ.
pub trait CatalogProvider {
    fn catalog(&self, language: &str) -> Result<Catalog>;
}

/// Catalog provider backed by a directory of `<lang>.yaml` files.
///
/// Each file holds a YAML (or JSON) list of questions.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
}

/// Outcome of comparing every language catalog against the fallback one.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub languages: Vec<String>,
    pub mismatched: Vec<String>,
    pub incomplete: Vec<(String, usize)>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatched.is_empty()
    }
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, language: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml", language))
    }

    /// Languages with a catalog file, sorted
    pub fn languages(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read catalog directory {}", self.dir.display()))?;

        let mut languages = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_valid_language_code(stem) => languages.push(stem.to_string()),
                _ => debug!("Skipping catalog file with invalid name {}", path.display()),
            }
        }
        languages.sort();
        Ok(languages)
    }

    /// Load every language and compare its id set with the fallback catalog.
    pub fn check_consistency(&self) -> Result<ConsistencyReport> {
        let reference = load_catalog_file(&self.path_for(FALLBACK_LANGUAGE), FALLBACK_LANGUAGE)?;
        let mut report = ConsistencyReport {
            languages: self.languages()?,
            ..Default::default()
        };

        for language in &report.languages {
            let catalog = load_catalog_file(&self.path_for(language), language)?;
            if catalog.len() != FULL_CATALOG_SIZE {
                warn!(
                    "Catalog '{}' has {} questions, expected {}",
                    language,
                    catalog.len(),
                    FULL_CATALOG_SIZE
                );
                report.incomplete.push((language.clone(), catalog.len()));
            }
            if !catalog.same_universe(&reference) {
                report.mismatched.push(language.clone());
            }
        }

        Ok(report)
    }
}

impl CatalogProvider for DirectoryCatalog {
    fn catalog(&self, language: &str) -> Result<Catalog> {
        if !is_valid_language_code(language) {
            warn!(
                "Invalid language code '{}', falling back to '{}'",
                language, FALLBACK_LANGUAGE
            );
            return self.catalog(FALLBACK_LANGUAGE);
        }

        let path = self.path_for(language);
        if path.exists() {
            return load_catalog_file(&path, language);
        }

        if language != FALLBACK_LANGUAGE {
            warn!(
                "Language '{}' not supported, falling back to '{}'",
                language, FALLBACK_LANGUAGE
            );
            let fallback = self.path_for(FALLBACK_LANGUAGE);
            if fallback.exists() {
                return load_catalog_file(&fallback, FALLBACK_LANGUAGE);
            }
        }

        anyhow::bail!(
            "No question catalog for '{}' in {}",
            language,
            self.dir.display()
        )
    }
}

/// Parse a catalog file into a validated `Catalog`.
pub fn load_catalog_file(path: &Path, language: &str) -> Result<Catalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file at {}", path.display()))?;

    let questions: Vec<QuestionSpec> = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse catalog: invalid YAML in {}", path.display()))?;

    let catalog = Catalog::new(language, questions)
        .with_context(|| format!("Invalid catalog in {}", path.display()))?;

    debug!(
        "Loaded {} questions for '{}' from {}",
        catalog.len(),
        language,
        path.display()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const EN: &str = r#"
- { id: "q1", domain: "O", facet: 1, keyed: plus, text: "Have a vivid imagination" }
- { id: "q2", domain: "N", facet: 1, keyed: minus, text: "Rarely worry" }
"#;

    const DE: &str = r#"
- { id: "q1", domain: "O", facet: 1, keyed: plus, text: "Habe eine lebhafte Fantasie" }
- { id: "q2", domain: "N", facet: 1, keyed: minus, text: "Mache mir selten Sorgen" }
"#;

    const FR: &str = r#"
- { id: "q1", domain: "O", facet: 1, keyed: plus }
- { id: "q3", domain: "N", facet: 1, keyed: minus }
"#;

    fn temp_catalog_dir(name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = env::temp_dir().join(format!("bigfive_test_catalog_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        for (lang, content) in files {
            fs::write(dir.join(format!("{}.yaml", lang)), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_requested_language() {
        let dir = temp_catalog_dir("requested", &[("en", EN), ("de", DE)]);
        let provider = DirectoryCatalog::new(&dir);

        let catalog = provider.catalog("de").unwrap();
        assert_eq!(catalog.language(), "de");
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("q1").unwrap().text.as_deref(),
            Some("Habe eine lebhafte Fantasie")
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unsupported_language_falls_back() {
        let dir = temp_catalog_dir("fallback", &[("en", EN)]);
        let provider = DirectoryCatalog::new(&dir);

        let catalog = provider.catalog("xx").unwrap();
        assert_eq!(catalog.language(), "en");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_language_code_stays_inside_dir() {
        let root = env::temp_dir().join("bigfive_test_catalog_escape");
        let _ = fs::remove_dir_all(&root);
        let dir = root.join("catalogs");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("en.yaml"), EN).unwrap();
        let outside = root.join("outside.yaml");
        fs::write(&outside, "- { id: \"evil\", domain: \"O\", facet: 1, keyed: plus }\n").unwrap();
        let provider = DirectoryCatalog::new(&dir);

        let relative = provider.catalog("../outside").unwrap();
        assert_eq!(relative.language(), "en");
        assert!(relative.get("evil").is_none());

        let absolute = root.join("outside");
        let absolute = provider.catalog(absolute.to_str().unwrap()).unwrap();
        assert_eq!(absolute.language(), "en");
        assert!(absolute.get("evil").is_none());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_language_code_rule() {
        assert!(is_valid_language_code("en"));
        assert!(is_valid_language_code("pt-br"));
        assert!(is_valid_language_code("zh_CN"));
        assert!(!is_valid_language_code(""));
        assert!(!is_valid_language_code("../en"));
        assert!(!is_valid_language_code("/etc/passwd"));
        assert!(!is_valid_language_code("e n"));
    }

    #[test]
    fn test_missing_fallback_is_error() {
        let dir = temp_catalog_dir("no_fallback", &[("de", DE)]);
        let provider = DirectoryCatalog::new(&dir);

        assert!(provider.catalog("xx").is_err());
        assert!(provider.catalog("en").is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_catalog_file() {
        let dir = temp_catalog_dir(
            "invalid",
            &[("en", "- { id: q1, domain: \"O\", facet: 9, keyed: plus }\n")],
        );
        let provider = DirectoryCatalog::new(&dir);

        let err = provider.catalog("en").unwrap_err();
        assert!(format!("{:#}", err).contains("facet 9"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_languages_listed_sorted() {
        let dir = temp_catalog_dir("languages", &[("en", EN), ("de", DE)]);
        fs::write(dir.join("README.txt"), "not a catalog").unwrap();
        let provider = DirectoryCatalog::new(&dir);

        assert_eq!(provider.languages().unwrap(), vec!["de", "en"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_consistency_check() {
        let dir = temp_catalog_dir("consistency", &[("en", EN), ("de", DE), ("fr", FR)]);
        let provider = DirectoryCatalog::new(&dir);

        let report = provider.check_consistency().unwrap();
        assert_eq!(report.languages, vec!["de", "en", "fr"]);
        assert_eq!(report.mismatched, vec!["fr"]);
        assert!(!report.is_consistent());
        // Every test catalog is smaller than a full 120-item bank
        assert_eq!(report.incomplete.len(), 3);

        let _ = fs::remove_dir_all(&dir);
    }
}
