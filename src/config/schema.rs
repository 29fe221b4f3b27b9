use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::FALLBACK_LANGUAGE;

/// CLI configuration.
///
/// Every field is optional; missing values fall back to defaults under
/// `~/.config/bigfive/`.
///
/// Example YAML:
/// ```yaml
/// default_language: de
/// catalog_dir: /srv/bigfive/catalogs
/// store_path: /srv/bigfive/assessments.json
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Language used when a request does not name one (default: "en")
    #[serde(default)]
    pub default_language: Option<String>,

    /// Directory holding `<lang>.yaml` question catalogs
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,

    /// JSON file where scored assessments are kept
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn language(&self) -> &str {
        self.default_language.as_deref().unwrap_or(FALLBACK_LANGUAGE)
    }
}
