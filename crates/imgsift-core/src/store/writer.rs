//! Temp-file writer with atomic finalize.
//!
//! Bytes go to `<final>.part`, are synced, then renamed into place so a final
//! name never refers to a partially written file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `image_1a2b3c4d.png` → `image_1a2b3c4d.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

pub(super) struct PendingFile {
    file: File,
    temp_path: PathBuf,
}

impl PendingFile {
    /// Create (or truncate) the temp file for `final_path`.
    pub(super) fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(PendingFile { file, temp_path })
    }

    pub(super) fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    /// Sync, close and rename to `final_path`. Consumes the writer.
    pub(super) fn finalize(self, final_path: &Path) -> io::Result<()> {
        self.file.sync_all()?;
        let temp_path = self.temp_path;
        drop(self.file);
        std::fs::rename(&temp_path, final_path)
    }

    /// Drop the temp file after a failed write.
    pub(super) fn discard(self) {
        let temp_path = self.temp_path;
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), "could not remove temp file: {}", e);
        }
    }
}

/// Write `data` to `final_path` through a temp file. On any failure the temp file is removed.
pub(super) fn write_atomic(final_path: &Path, data: &[u8]) -> io::Result<()> {
    let mut pending = PendingFile::create(final_path)?;
    if let Err(e) = pending.write_all(data) {
        pending.discard();
        return Err(e);
    }
    let temp = temp_path(final_path);
    pending.finalize(final_path).inspect_err(|_| {
        let _ = std::fs::remove_file(&temp);
    })
}
