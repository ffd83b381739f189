//! Content store errors.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store root could not be created. Fatal: nothing can be stored.
    #[error("cannot create store directory {}", .path.display())]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The store root could not be listed when building the index.
    #[error("cannot scan store directory {}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing a new image failed (permissions, disk full, ...). Ends the attempt, not the run.
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
