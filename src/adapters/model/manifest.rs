//! Model manifest: SHA-256 bindings for model artifact files.
//!
//! `manifest.json` lives next to the model and maps file names to their
//! expected hex digests. A mismatch means the artifact was corrupted or
//! replaced after export.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ModelLoadError;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    pub files: BTreeMap<String, String>,
}

impl ModelManifest {
    /// Build a manifest binding the given files (paths relative to `dir`).
    ///
    /// # Errors
    /// Returns error if a file cannot be read.
    pub fn for_files(dir: &Path, names: &[String]) -> Result<Self, ModelLoadError> {
        let mut files = BTreeMap::new();
        for name in names {
            let path = dir.join(name);
            let bytes = fs::read(&path).map_err(|source| ModelLoadError::Read {
                path: path.clone(),
                source,
            })?;
            files.insert(name.clone(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            files,
        })
    }

    /// Read and parse `manifest.json` from `dir`, if present.
    ///
    /// # Errors
    /// Returns error if the manifest exists but is unreadable or malformed.
    pub fn read_from(dir: &Path) -> Result<Option<Self>, ModelLoadError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|source| ModelLoadError::Read {
            path: path.clone(),
            source,
        })?;
        let manifest: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ModelLoadError::Manifest(format!("invalid {MANIFEST_FILE}: {e}")))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(ModelLoadError::Manifest(format!(
                "unsupported manifest version {}",
                manifest.version
            )));
        }
        Ok(Some(manifest))
    }

    /// Check that `file_name` is bound by the manifest and `bytes` match its digest.
    ///
    /// # Errors
    /// Returns `ModelLoadError::Manifest` on a missing binding or hash mismatch.
    pub fn verify(&self, file_name: &str, bytes: &[u8]) -> Result<(), ModelLoadError> {
        let expected = self.files.get(file_name).ok_or_else(|| {
            ModelLoadError::Manifest(format!("{MANIFEST_FILE} does not bind {file_name}"))
        })?;

        let actual = sha256_hex(bytes);
        if !constant_time_eq_str(&actual, &expected.to_ascii_lowercase()) {
            return Err(ModelLoadError::Manifest(format!(
                "hash mismatch for {file_name}"
            )));
        }
        Ok(())
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for ASCII hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_detects_tampering() {
        let temp = tempdir().expect("tempdir");
        std::fs::write(temp.path().join("model.json"), b"{}").expect("write");

        let manifest =
            ModelManifest::for_files(temp.path(), &["model.json".to_string()]).expect("manifest");
        assert!(manifest.verify("model.json", b"{}").is_ok());
        assert!(matches!(
            manifest.verify("model.json", b"{ }"),
            Err(ModelLoadError::Manifest(_))
        ));
        assert!(manifest.verify("other.json", b"{}").is_err());
    }

    #[test]
    fn test_read_from_missing_and_bad_version() {
        let temp = tempdir().expect("tempdir");
        assert!(ModelManifest::read_from(temp.path()).expect("read").is_none());

        std::fs::write(
            temp.path().join(MANIFEST_FILE),
            br#"{"version":2,"files":{}}"#,
        )
        .expect("write");
        assert!(ModelManifest::read_from(temp.path()).is_err());
    }
}
