use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::records::{Category, CategoryRecord};

/// Whole-file JSON persistence for normalized records, keyed by
/// (body, session, category). The stored files are the only interface
/// between the scrape and build phases.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the JSON document backing one unit.
    pub fn file_path(&self, body: &str, session: &str, category: Category) -> PathBuf {
        self.root.join(paths::data_file(body, session, category))
    }

    /// Replace the stored records for one unit. The write goes through a
    /// temp file in the destination directory and a rename, so a reader
    /// never observes a partially written document.
    pub fn save(
        &self,
        body: &str,
        session: &str,
        category: Category,
        records: &[CategoryRecord],
    ) -> Result<()> {
        let path = self.file_path(body, session, category);
        let mut payload = serde_json::to_vec_pretty(records)?;
        payload.push(b'\n');
        write_atomic(&path, &payload)
    }

    pub fn load(&self, body: &str, session: &str, category: Category) -> Result<Vec<CategoryRecord>> {
        let path = self.file_path(body, session, category);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound { path })
            }
            Err(err) => return Err(err.into()),
        };
        let records: Vec<CategoryRecord> = serde_json::from_str(&raw).map_err(|err| Error::Corrupt {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        if let Some(stray) = records.iter().find(|r| r.category() != category) {
            return Err(Error::Corrupt {
                path,
                reason: format!("found a {} record in a {} file", stray.category(), category),
            });
        }
        Ok(records)
    }
}

/// Write `bytes` to `path` through a sibling temp file and a rename, so an
/// interrupted run never leaves a half-written file behind. Used for both
/// persisted JSON and rendered HTML.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Config(format!("no parent directory for {}", path.display())))?;
    fs::create_dir_all(dir)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("out");
    let tmp = dir.join(format!(".{file_name}.tmp"));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
