//! `imgsift list` – show the images in a store directory.

use anyhow::Result;
use imgsift_core::store::ContentStore;
use std::path::Path;

pub async fn run_list(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        println!("No image store at {}.", dir.display());
        return Ok(());
    }
    // Read-only: a `collect` may be writing into the same directory.
    let store = ContentStore::open_read_only(dir)?;
    if store.is_empty() {
        println!("No images in {}.", dir.display());
        return Ok(());
    }
    println!("{:<32}  {:>10}  {:<7}  {}", "FINGERPRINT", "BYTES", "FORMAT", "FILE");
    for image in store.images() {
        println!(
            "{:<32}  {:>10}  {:<7}  {}",
            image.fingerprint,
            image.len,
            image.format,
            image.file_name()
        );
    }
    println!("{} image(s) in {}", store.len(), dir.display());
    Ok(())
}
