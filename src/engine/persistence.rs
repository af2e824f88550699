use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::store::Record;
use crate::{Error, Result};

/// Handles disk I/O for the [`crate::PrefStore`].
///
/// The whole store lives in one JSON file. Saving uses an atomic
/// "write-then-rename" strategy so a crash mid-write cannot leave a
/// truncated file behind.
pub struct Persistence {
    path: PathBuf,
}

/// On-disk document shape: `{ "playerPrefs": [ {record}, ... ] }`.
///
/// The outer field name is fixed for compatibility with preference files
/// written by earlier implementations of this format.
#[derive(Serialize, Deserialize, Default)]
struct PrefsFile {
    #[serde(rename = "playerPrefs")]
    prefs: Vec<Record>,
}

impl Persistence {
    /// Creates a persistence handler for the given file path.
    ///
    /// No I/O happens here; [`Persistence::load`] reads the file and
    /// [`Persistence::save`] creates missing parent directories.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The file path this handler reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the preference file.
    ///
    /// A missing file yields an empty record list. A file that exists but
    /// does not parse fails with [`Error::Load`] rather than being skipped,
    /// so corruption is never silently turned into an empty store.
    pub fn load(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read(&self.path)?;
        let file: PrefsFile = serde_json::from_slice(&content).map_err(Error::Load)?;
        Ok(file.prefs)
    }

    /// Writes the full record list to the preference file atomically.
    ///
    /// Creates the parent directory recursively if it is missing, writes to
    /// a `.tmp` sibling first, then renames it over the target.
    pub fn save(&self, records: &[Record]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let file = PrefsFile {
            prefs: records.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&file).map_err(Error::Serialization)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;
        log::debug!("saved {} records to {:?}", records.len(), self.path);

        Ok(())
    }
}
