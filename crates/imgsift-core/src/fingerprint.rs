//! Content fingerprints used as the deduplication key.
//!
//! A fingerprint is the first 128 bits of the SHA-256 digest of the payload,
//! rendered as 32 lowercase hex characters.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Number of digest bytes kept (128 bits).
pub const FINGERPRINT_LEN: usize = 16;

/// Length of the hex prefix used in stored filenames.
pub const SHORT_HEX_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Fingerprint of an in-memory payload. Never fails, including for empty input.
    pub fn of(bytes: &[u8]) -> Self {
        Self::from_digest(Sha256::digest(bytes).as_slice())
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut out = [0u8; FINGERPRINT_LEN];
        out.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Fingerprint(out)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Full 32-char lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex chars, used as the filename stem.
    pub fn short(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(SHORT_HEX_LEN);
        s
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_hex())
    }
}

/// Error parsing a fingerprint from hex.
#[derive(Debug, thiserror::Error)]
#[error("invalid fingerprint {input:?}: expected 32 hex chars")]
pub struct ParseFingerprintError {
    input: String,
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFingerprintError {
            input: s.to_string(),
        };
        let raw = hex::decode(s.trim()).map_err(|_| err())?;
        if raw.len() != FINGERPRINT_LEN {
            return Err(err());
        }
        Ok(Self::from_digest(&raw))
    }
}

/// Fingerprint a file on disk. Reads in chunks to keep memory use bounded.
pub fn fingerprint_path(path: &Path) -> Result<Fingerprint> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint::from_digest(hasher.finalize().as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_payload_has_known_fingerprint() {
        let fp = Fingerprint::of(b"");
        assert_eq!(fp.to_hex(), "e3b0c44298fc1c149afbf4c8996fb924");
        assert_eq!(fp.short(), "e3b0c442");
    }

    #[test]
    fn equal_bytes_equal_fingerprint() {
        let a = Fingerprint::of(b"\x89PNG\r\n\x1a\nsome pixels");
        let b = Fingerprint::of(b"\x89PNG\r\n\x1a\nsome pixels");
        let c = Fingerprint::of(b"\x89PNG\r\n\x1a\nother pixels");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn file_and_memory_agree() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let from_file = fingerprint_path(f.path()).unwrap();
        assert_eq!(from_file, Fingerprint::of(b"hello\n"));
        assert_eq!(from_file.to_hex(), "5891b5b522d5df086d0ff0b110fbd9d2");
    }

    #[test]
    fn parse_hex() {
        let fp = Fingerprint::of(b"abc");
        let parsed: Fingerprint = fp.to_hex().parse().unwrap();
        assert_eq!(parsed, fp);
        assert!("abc".parse::<Fingerprint>().is_err());
        assert!("zz".repeat(16).parse::<Fingerprint>().is_err());
    }
}
