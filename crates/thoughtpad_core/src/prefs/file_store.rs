//! JSON file-backed preference store.
//!
//! # Invariants
//! - The on-disk file is a flat JSON object of string values.
//! - Writes go to a sibling temp file which is then renamed over the
//!   target, so a crash never leaves a half-written file.
//! - A file that fails to parse is replaced by empty preferences.

use super::{migrate_defaults, PrefKey, PrefsError, PrefsMap, PrefsResult, PrefsStore};
use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Preference store persisted as a JSON object on disk.
#[derive(Debug)]
pub struct JsonFilePrefsStore {
    path: PathBuf,
    values: Mutex<PrefsMap>,
}

impl JsonFilePrefsStore {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// # Side effects
    /// - Replaces a corrupt file with empty preferences.
    /// - Writes default values for keys missing from older files.
    pub fn open(path: impl Into<PathBuf>) -> PrefsResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PrefsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let (mut values, mut dirty) = read_map(&path)?;
        if migrate_defaults(&mut values) {
            dirty = true;
        }
        if dirty {
            write_map(&path, &values)?;
        }

        info!(
            "event=prefs_open module=prefs status=ok keys={}",
            values.len()
        );
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(&self, apply: impl FnOnce(&mut PrefsMap)) -> PrefsResult<()> {
        let mut values = self.values.lock().map_err(|_| PrefsError::Poisoned)?;
        let mut next = values.clone();
        apply(&mut next);
        write_map(&self.path, &next)?;
        *values = next;
        Ok(())
    }
}

impl PrefsStore for JsonFilePrefsStore {
    fn snapshot(&self) -> PrefsResult<PrefsMap> {
        let values = self.values.lock().map_err(|_| PrefsError::Poisoned)?;
        Ok(values.clone())
    }

    fn set(&self, key: PrefKey, value: &str) -> PrefsResult<()> {
        self.mutate(|values| {
            values.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn remove(&self, key: PrefKey) -> PrefsResult<()> {
        self.mutate(|values| {
            values.remove(key.as_str());
        })
    }
}

/// Reads the map; the flag is `true` when the file must be rewritten.
fn read_map(path: &Path) -> PrefsResult<(PrefsMap, bool)> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok((PrefsMap::new(), true)),
        Err(source) => {
            return Err(PrefsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_slice::<PrefsMap>(&raw) {
        Ok(values) => Ok((values, false)),
        Err(err) => {
            warn!(
                "event=prefs_open module=prefs status=recovered error_code=prefs_corrupt error={err}"
            );
            Ok((PrefsMap::new(), true))
        }
    }
}

fn write_map(path: &Path, values: &PrefsMap) -> PrefsResult<()> {
    let encoded = serde_json::to_vec_pretty(values).map_err(PrefsError::Encode)?;
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, encoded).map_err(|source| PrefsError::Io {
        path: temp_path.clone(),
        source,
    })?;
    std::fs::rename(&temp_path, path).map_err(|source| PrefsError::Io {
        path: path.to_path_buf(),
        source,
    })
}
