mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::catalog::is_valid_language_code;

/// Get the config directory path (~/.config/bigfive/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("bigfive"))
}

/// Get the default config file path (~/.config/bigfive/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/bigfive/config.yaml) and falls back to defaults when that
///   file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!(
            "No config file at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref language) = config.default_language {
        if !is_valid_language_code(language) {
            errors.push(format!(
                "default_language: invalid language code '{}'",
                language
            ));
        }
    }

    if let Some(ref dir) = config.catalog_dir {
        if dir.as_os_str().is_empty() {
            errors.push("catalog_dir: must not be empty".to_string());
        } else if dir.exists() && !dir.is_dir() {
            errors.push(format!("catalog_dir: {} is not a directory", dir.display()));
        }
    }

    if let Some(ref path) = config.store_path {
        if path.as_os_str().is_empty() {
            errors.push("store_path: must not be empty".to_string());
        } else if path.is_dir() {
            errors.push(format!("store_path: {} is a directory", path.display()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Resolve the catalog directory (config value or ~/.config/bigfive/catalogs)
pub fn catalog_dir(config: &Config) -> Result<PathBuf> {
    match config.catalog_dir {
        Some(ref dir) => Ok(dir.clone()),
        None => Ok(get_config_dir()?.join("catalogs")),
    }
}

/// Resolve the assessment store path (config value or ~/.config/bigfive/assessments.json)
pub fn store_path(config: &Config) -> Result<PathBuf> {
    match config.store_path {
        Some(ref path) => Ok(path.clone()),
        None => crate::store::get_store_path(),
    }
}
