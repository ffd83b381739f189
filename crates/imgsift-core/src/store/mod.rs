//! Deduplicating image store backed by a single directory.
//!
//! The directory is the persistent index: on `open` every regular file is
//! fingerprinted once into an in-memory map, and every `put` updates that map.
//! Files are named `image_<first-8-hex>.<ext>`; a name already taken by other
//! content gets a numeric suffix instead of being overwritten.

mod error;
mod writer;

pub use error::StoreError;
pub use writer::{temp_path, TEMP_SUFFIX};

use crate::fingerprint::{fingerprint_path, Fingerprint};
use crate::format::ImageFormat;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// An image persisted in the store. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub fingerprint: Fingerprint,
    pub path: PathBuf,
    pub len: u64,
    pub format: ImageFormat,
}

impl StoredImage {
    /// File name for display (`image_1a2b3c4d.png`).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Fingerprint → stored image, for one store directory.
///
/// `put` takes `&mut self`, so writers are serialized by the borrow checker;
/// share a store between threads only behind a `Mutex` so exists-then-put for
/// one fingerprint can never produce two files.
#[derive(Debug)]
pub struct ContentStore {
    root: PathBuf,
    index: HashMap<Fingerprint, StoredImage>,
}

impl ContentStore {
    /// Open (creating if needed) the store at `root` and index its files.
    /// Leftover temp files from an interrupted write are removed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::CreateRoot {
            path: root.clone(),
            source,
        })?;
        Self::load(root, true)
    }

    /// Index an existing store without creating or deleting anything.
    /// Temp files are skipped, so a concurrent writer's `.part` file survives.
    pub fn open_read_only(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::load(root.into(), false)
    }

    fn load(root: PathBuf, remove_temp_files: bool) -> Result<Self, StoreError> {
        let mut store = ContentStore {
            root,
            index: HashMap::new(),
        };
        store.scan(remove_temp_files)?;
        tracing::debug!(
            root = %store.root.display(),
            images = store.index.len(),
            read_only = !remove_temp_files,
            "content store opened"
        );
        Ok(store)
    }

    fn scan(&mut self, remove_temp_files: bool) -> Result<(), StoreError> {
        let scan_err = |source| StoreError::Scan {
            path: self.root.clone(),
            source,
        };
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file {
                paths.push(entry.path());
            }
        }
        // Stable order so the first copy of on-disk duplicates wins deterministically.
        paths.sort();

        for path in paths {
            if path.to_string_lossy().ends_with(TEMP_SUFFIX) {
                if !remove_temp_files {
                    continue;
                }
                match fs::remove_file(&path) {
                    Ok(()) => tracing::warn!(path = %path.display(), "removed leftover temp file"),
                    Err(e) => tracing::warn!(path = %path.display(), "leftover temp file not removed: {}", e),
                }
                continue;
            }
            let fingerprint = match fingerprint_path(&path) {
                Ok(fp) => fp,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping unreadable file: {:#}", e);
                    continue;
                }
            };
            if let Some(first) = self.index.get(&fingerprint) {
                tracing::debug!(
                    path = %path.display(),
                    original = %first.path.display(),
                    "duplicate content already on disk"
                );
                continue;
            }
            let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            let format = path
                .extension()
                .map(|e| ImageFormat::from_extension(&e.to_string_lossy()))
                .unwrap_or(ImageFormat::Unknown);
            self.index.insert(
                fingerprint,
                StoredImage {
                    fingerprint,
                    path,
                    len,
                    format,
                },
            );
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True if content with this fingerprint is already stored.
    pub fn exists(&self, fingerprint: &Fingerprint) -> bool {
        self.index.contains_key(fingerprint)
    }

    /// The stored copy of this content, if any.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&StoredImage> {
        self.index.get(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All stored images, sorted by path.
    pub fn images(&self) -> Vec<&StoredImage> {
        let mut all: Vec<&StoredImage> = self.index.values().collect();
        all.sort_by(|a, b| a.path.cmp(&b.path));
        all
    }

    /// Persist `bytes` as a new image. If the content is already stored, returns
    /// the existing record without writing.
    pub fn put(&mut self, bytes: &[u8], format: ImageFormat) -> Result<StoredImage, StoreError> {
        let fingerprint = Fingerprint::of(bytes);
        if let Some(existing) = self.index.get(&fingerprint) {
            return Ok(existing.clone());
        }

        let path = self.free_name(&fingerprint, format);
        writer::write_atomic(&path, bytes).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        let image = StoredImage {
            fingerprint,
            path,
            len: bytes.len() as u64,
            format,
        };
        self.index.insert(fingerprint, image.clone());
        Ok(image)
    }

    /// First unused `image_<short>[_n].<ext>` path under the root.
    fn free_name(&self, fingerprint: &Fingerprint, format: ImageFormat) -> PathBuf {
        let stem = format!("image_{}", fingerprint.short());
        let ext = format.extension();
        let mut candidate = self.root.join(format!("{}.{}", stem, ext));
        let mut n = 1u32;
        while candidate.exists() || temp_path(&candidate).exists() {
            candidate = self.root.join(format!("{}_{}.{}", stem, n, ext));
            n += 1;
        }
        if n > 1 {
            tracing::debug!(
                fingerprint = %fingerprint,
                path = %candidate.display(),
                "filename prefix taken by other content, disambiguated"
            );
        }
        candidate
    }
}
