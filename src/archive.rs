use memmap2::Mmap;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::ZipArchive;
use zip::read::ZipFile;
use zip::result::ZipError;

use crate::error::{Result, VerifyError};

/// One entry of the central directory, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the central directory; the handle for `Archive::read_entry`.
    pub index: usize,
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Upper bound on the buffer reserved from a declared entry size.
const MAX_PREALLOC: u64 = 1 << 20;

#[derive(Clone)]
struct Mapping(Arc<Mmap>);

impl AsRef<[u8]> for Mapping {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An opened jar. The file mapping lives until the last clone is dropped.
///
/// Clones share the mapping and the parsed central directory, so a resolver
/// can read class files from the artifact being enumerated without mapping
/// it again.
#[derive(Clone)]
pub struct Archive {
    path: PathBuf,
    map: Mapping,
    zip: ZipArchive<Cursor<Mapping>>,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        let open_error = |source: ZipError| VerifyError::ArchiveOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| open_error(e.into()))?;
        // SAFETY: The file is mapped read-only and the mapping is owned by the
        // returned archive; artifacts are not rewritten while being verified.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| open_error(e.into()))?;
        let map = Mapping(Arc::new(mmap));
        let zip = ZipArchive::new(Cursor::new(map.clone())).map_err(open_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            map,
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of central directory records, duplicates included.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// Lazy, single-pass walk over every entry. Reopen or call again to restart.
    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            archive: self,
            next: 0,
        }
    }

    pub fn entry(&mut self, index: usize) -> Result<ArchiveEntry> {
        let file = self
            .zip
            .by_index_raw(index)
            .map_err(|source| read_error(&self.path, source))?;
        Ok(ArchiveEntry {
            index,
            name: file.name().to_string(),
            is_dir: file.is_dir(),
            size: file.size(),
        })
    }

    pub fn read_entry(&mut self, index: usize) -> Result<Vec<u8>> {
        let file = self
            .zip
            .by_index(index)
            .map_err(|source| read_error(&self.path, source))?;
        read_payload(&self.path, file)
    }

    /// Payload of the entry called `name`, or `None` when there is no such entry.
    pub fn read_by_name(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let file = match self.zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(source) => return Err(read_error(&self.path, source)),
        };
        read_payload(&self.path, file).map(Some)
    }

    /// Hex-encoded SHA-256 of the whole artifact file.
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(self.map.as_ref()))
    }
}

// The declared size comes from the central directory and is not trusted.
fn read_payload(path: &Path, mut file: ZipFile<'_>) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
    file.read_to_end(&mut bytes)
        .map_err(|e| read_error(path, e.into()))?;
    Ok(bytes)
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("entries", &self.zip.len())
            .finish()
    }
}

pub struct Entries<'a> {
    archive: &'a mut Archive,
    next: usize,
}

impl Iterator for Entries<'_> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.archive.len() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.archive.entry(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.archive.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

fn read_error(path: &Path, source: ZipError) -> VerifyError {
    VerifyError::ArchiveRead {
        path: path.to_path_buf(),
        source,
    }
}
