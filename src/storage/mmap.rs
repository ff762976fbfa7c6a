//! # Memory-Mapped Index Files
//!
//! An encoded index is position-independent, so persisting it is a plain byte
//! copy and loading it is a read-only `mmap`. Searches then run directly
//! against the mapped pages:
//!
//! ```text
//! IndexBuilder ──build──> TreeImage ──encode──> Vec<u8> ──write_index──> file
//!                                                                          │
//!                     SearchIndex<'_> <──search── MappedIndex <──open──────┘
//! ```
//!
//! ## Lifetime Safety
//!
//! [`MappedIndex::search`] borrows the mapping, so a `SearchIndex` can never
//! outlive the pages it points into. Dropping the `MappedIndex` unmaps the file.
//!
//! ## Error Handling
//!
//! All fallible operations return `eyre::Result` with the file path and the
//! operation that failed.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use eyre::{ensure, Result, WrapErr};
use memmap2::Mmap;

use crate::btree::SearchIndex;
use crate::config::INDEX_HEADER_SIZE;
use crate::cpu::CpuFeatures;
use crate::encoding::{IndexKey, IndexValue};

/// A read-only memory mapping of an encoded index file.
#[derive(Debug)]
pub struct MappedIndex {
    mmap: Mmap,
}

impl MappedIndex {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .wrap_err_with(|| format!("failed to open index file '{}'", path.display()))?;

        let file_size = file
            .metadata()
            .wrap_err_with(|| format!("failed to get metadata for '{}'", path.display()))?
            .len();

        ensure!(
            file_size >= INDEX_HEADER_SIZE as u64,
            "index file '{}' is {} bytes, smaller than the {}-byte header",
            path.display(),
            file_size,
            INDEX_HEADER_SIZE
        );

        // SAFETY: Mmap::map is unsafe because the file could be modified or
        // truncated by another process while mapped. Index files are written
        // once by `write_index` and never modified in place, and every search
        // borrows the mapping so no slice outlives it.
        let mmap = unsafe {
            Mmap::map(&file)
                .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
        };

        tracing::debug!(path = %path.display(), bytes = mmap.len(), "mapped index file");

        Ok(Self { mmap })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Opens a searcher over the mapped bytes using the detected CPU features.
    pub fn search<K: IndexKey, V: IndexValue>(
        &self,
        dimension: usize,
    ) -> Result<SearchIndex<'_, K, V>> {
        SearchIndex::open(self.as_bytes(), dimension)
    }

    /// Opens a searcher over the mapped bytes with an explicit capability set.
    pub fn search_with<K: IndexKey, V: IndexValue>(
        &self,
        dimension: usize,
        features: CpuFeatures,
    ) -> Result<SearchIndex<'_, K, V>> {
        SearchIndex::open_with(self.as_bytes(), dimension, features)
    }
}

/// Writes an encoded index to `path`, replacing any existing file, and syncs it.
pub fn write_index<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();

    ensure!(
        bytes.len() >= INDEX_HEADER_SIZE,
        "refusing to write {} bytes: not an encoded index",
        bytes.len()
    );

    let mut file = File::create(path)
        .wrap_err_with(|| format!("failed to create index file '{}'", path.display()))?;
    file.write_all(bytes)
        .wrap_err_with(|| format!("failed to write {} bytes to '{}'", bytes.len(), path.display()))?;
    file.sync_all()
        .wrap_err_with(|| format!("failed to sync '{}'", path.display()))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote index file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_rejects_missing_file() {
        let dir = tempdir().unwrap();
        let err = MappedIndex::open(dir.path().join("missing.sbt")).unwrap_err();
        assert!(err.to_string().contains("failed to open index file"));
    }

    #[test]
    fn open_rejects_file_shorter_than_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.sbt");
        std::fs::write(&path, [0u8; 5]).unwrap();

        let err = MappedIndex::open(&path).unwrap_err();
        assert!(err.to_string().contains("smaller than"));
    }

    #[test]
    fn write_index_rejects_non_index_bytes() {
        let dir = tempdir().unwrap();
        assert!(write_index(dir.path().join("x.sbt"), &[1, 2, 3]).is_err());
    }

    #[test]
    fn write_then_map_preserves_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.sbt");
        let bytes: Vec<u8> = (0u8..40).collect();

        write_index(&path, &bytes).unwrap();
        let mapped = MappedIndex::open(&path).unwrap();

        assert_eq!(mapped.len(), 40);
        assert!(!mapped.is_empty());
        assert_eq!(mapped.as_bytes(), bytes.as_slice());
    }
}
