//! `imgsift fingerprint` – print the content fingerprint of a file.

use anyhow::Result;
use imgsift_core::fingerprint::fingerprint_path;
use std::path::Path;

/// Same digest the store uses as its dedup key.
pub async fn run_fingerprint(path: &Path) -> Result<()> {
    let fingerprint = fingerprint_path(path)?;
    println!("{}  {}", fingerprint, path.display());
    Ok(())
}
