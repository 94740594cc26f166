use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, VerifyError};

/// Tracks entry names seen during one archive scan.
///
/// Restrictive class loaders reject archives that repeat an entry name, so
/// the first repeat fails the scan of that archive.
#[derive(Debug)]
pub struct DuplicateDetector {
    archive: PathBuf,
    seen: HashSet<String>,
}

impl DuplicateDetector {
    pub fn new(archive: &Path) -> Self {
        Self {
            archive: archive.to_path_buf(),
            seen: HashSet::new(),
        }
    }

    pub fn observe(&mut self, name: &str) -> Result<()> {
        if self.seen.contains(name) {
            return Err(VerifyError::DuplicateEntry {
                archive: self.archive.clone(),
                entry: name.to_string(),
            });
        }
        self.seen.insert(name.to_string());
        Ok(())
    }

    /// Number of distinct names accepted so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
