//! Deployment revision manifest and content fingerprint.
//!
//! The manifest is a plain text file written by the deploy tooling, one record
//! per line (`field field ... # comment`). It is read exactly once at startup.
//! The fingerprint of its raw bytes namespaces the cache and versions static
//! asset URLs, so any change to the deployed content invalidates both.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

/// Number of digest bytes kept in the fingerprint (32 hex characters).
const FINGERPRINT_BYTES: usize = 16;

/// Errors raised while loading the revision manifest.
#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("failed to read revision manifest {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Hex digest identifying one exact manifest content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionFingerprint(String);

impl RevisionFingerprint {
    /// Fingerprint the exact raw bytes of a manifest.
    pub fn of(raw: &[u8]) -> Self {
        let digest = Sha256::digest(raw);
        Self(hex::encode(&digest[..FINGERPRINT_BYTES]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed manifest records, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionManifest {
    records: Vec<Vec<String>>,
}

impl RevisionManifest {
    /// Parse manifest text.
    ///
    /// Blank lines and lines starting with `#` are skipped. Everything after
    /// the first `#` of a line is a comment. The remainder is split on
    /// whitespace; lines left with no tokens are dropped.
    pub fn parse(text: &str) -> Self {
        let records = text
            .lines()
            .filter(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|line| {
                let content = line.split('#').next().unwrap_or_default();
                content
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|fields| !fields.is_empty())
            .collect();

        Self { records }
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// The deployed revision: parsed manifest plus its fingerprint.
///
/// Built once during startup and shared read-only through `AppState`.
#[derive(Debug, Clone, Default)]
pub struct Revision {
    manifest: RevisionManifest,
    fingerprint: Option<RevisionFingerprint>,
}

impl Revision {
    /// Load the manifest at `path`.
    ///
    /// A missing file is not an error: it yields an empty manifest and no
    /// fingerprint, which disables revision-based versioning.
    pub async fn load(path: &Path) -> Result<Self, RevisionError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no revision manifest, versioning disabled");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(RevisionError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let revision = Self::from_bytes(&raw);
        debug!(
            path = %path.display(),
            records = revision.manifest.len(),
            "loaded revision manifest"
        );
        Ok(revision)
    }

    /// Build a revision from raw manifest bytes.
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self {
            manifest: RevisionManifest::parse(&String::from_utf8_lossy(raw)),
            fingerprint: Some(RevisionFingerprint::of(raw)),
        }
    }

    pub fn manifest(&self) -> &RevisionManifest {
        &self.manifest
    }

    pub fn fingerprint(&self) -> Option<&RevisionFingerprint> {
        self.fingerprint.as_ref()
    }

    /// Compose the cache namespace: `existing + fingerprint + "/"`.
    ///
    /// Without a fingerprint the existing prefix is returned unchanged.
    pub fn cache_key_prefix(&self, existing: &str) -> String {
        match &self.fingerprint {
            Some(fingerprint) => format!("{existing}{fingerprint}/"),
            None => existing.to_string(),
        }
    }

    /// Build a static asset URL: `prefix/path[?v=fingerprint]`.
    pub fn asset_url(&self, prefix: &str, path: &str) -> String {
        let base = format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        match &self.fingerprint {
            Some(fingerprint) => format!("{base}?v={fingerprint}"),
            None => base,
        }
    }
}
