use super::types::{AssessmentRecord, StoreState, STORE_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistence for scored assessments. Scoring never touches a store; the
/// caller saves results after a successful call.
pub trait AssessmentStore {
    fn save(&mut self, record: AssessmentRecord) -> Result<()>;
    fn load(&self, assessment_id: &str) -> Result<Option<AssessmentRecord>>;
    /// A user's assessments, newest first
    fn history(&self, user_id: &str) -> Result<Vec<AssessmentRecord>>;
    /// Returns true if the assessment existed
    fn delete(&mut self, assessment_id: &str) -> Result<bool>;
}

/// Get the default store file path (~/.config/bigfive/assessments.json)
pub fn get_store_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("assessments.json"))
}

/// Load store state from a JSON file
///
/// If the file doesn't exist, returns a new empty state.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store_state(path: &Path) -> Result<StoreState> {
    if !path.exists() {
        return Ok(StoreState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open assessment store at {}", path.display()))?;

    let state: StoreState =
        serde_json::from_reader(file).context("Failed to load assessment store")?;

    if state.version != STORE_VERSION {
        anyhow::bail!("Unsupported assessment store version: {}", state.version);
    }

    Ok(state)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory at {}", parent.display())
            })?;
        }
    }
    Ok(())
}

/// Save store state to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_store_state(path: &Path, state: &StoreState) -> Result<()> {
    ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state)
        .context("Failed to serialize assessment store")?;

    file.commit().context("Failed to save assessment store")?;

    Ok(())
}

/// Store backed by a single JSON document, rewritten atomically on change.
///
/// `save` and `delete` hold an exclusive lock on `<path>.lock` across the
/// whole read-modify-write, so concurrent processes do not drop each other's
/// records. Reads take no lock; the atomic rename means they always see a
/// complete document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Run `update` on the current state under the store lock and persist the result
    fn update<T>(&self, update: impl FnOnce(&mut StoreState) -> (T, bool)) -> Result<T> {
        ensure_parent_dir(&self.path)?;
        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open store lock at {}", lock_path.display()))?;
        lock.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;

        // Lock is released when `lock` is dropped
        let mut state = load_store_state(&self.path)?;
        let (value, changed) = update(&mut state);
        if changed {
            save_store_state(&self.path, &state)?;
        }
        Ok(value)
    }
}

impl AssessmentStore for JsonFileStore {
    fn save(&mut self, record: AssessmentRecord) -> Result<()> {
        debug!(
            "Saving assessment {} to {}",
            record.assessment_id,
            self.path.display()
        );
        self.update(|state| {
            state.insert(record);
            ((), true)
        })
    }

    fn load(&self, assessment_id: &str) -> Result<Option<AssessmentRecord>> {
        let state = load_store_state(&self.path)?;
        Ok(state.get(assessment_id).cloned())
    }

    fn history(&self, user_id: &str) -> Result<Vec<AssessmentRecord>> {
        Ok(load_store_state(&self.path)?.for_user(user_id))
    }

    fn delete(&mut self, assessment_id: &str) -> Result<bool> {
        self.update(|state| {
            let removed = state.remove(assessment_id);
            (removed, removed)
        })
    }
}

/// In-process store, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: StoreState,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssessmentStore for MemoryStore {
    fn save(&mut self, record: AssessmentRecord) -> Result<()> {
        self.state.insert(record);
        Ok(())
    }

    fn load(&self, assessment_id: &str) -> Result<Option<AssessmentRecord>> {
        Ok(self.state.get(assessment_id).cloned())
    }

    fn history(&self, user_id: &str) -> Result<Vec<AssessmentRecord>> {
        Ok(self.state.for_user(user_id))
    }

    fn delete(&mut self, assessment_id: &str) -> Result<bool> {
        Ok(self.state.remove(assessment_id))
    }
}
