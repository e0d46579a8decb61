//! Registry catalog, artifact store, and integrity verification for Folio.
//!
//! This crate provides the storage layer of an extensions repository: the
//! `Registry` catalog persisted as `registry.json` through `RegistryStore`
//! with atomic writes, the pure `reconcile` decision that compares a new
//! submission against the catalog, the flat `ArtifactStore` holding published
//! archives, `RepoLayout` for path management, and SHA-256 digests plus
//! `verify_registry_integrity` for checking artifacts against their entries.

pub mod artifacts;
pub mod integrity;
pub mod layout;
pub mod reconcile;
pub mod registry;

pub use artifacts::ArtifactStore;
pub use integrity::{
    digest_bytes, digest_file, verify_registry_integrity, ArtifactDigest, IntegrityFailure,
    IntegrityReport,
};
pub use layout::RepoLayout;
pub use reconcile::{reconcile, Reconciliation};
pub use registry::{
    utc_timestamp, EntryKind, Registry, RegistryEntry, RegistryStore, REGISTRY_FORMAT_VERSION,
};

use std::path::Path;
use thiserror::Error;

/// Fsync a directory so that a preceding `rename()` is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid artifact file name: {0}")]
    InvalidArtifactName(String),
    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display_invalid_artifact_name() {
        let e = StoreError::InvalidArtifactName("../x.zip".to_owned());
        let msg = e.to_string();
        assert!(msg.contains("invalid artifact file name"));
        assert!(msg.contains("../x.zip"));
    }

    #[test]
    fn store_error_display_artifact_not_found() {
        let e = StoreError::ArtifactNotFound("kjv-theme-1.0.0.zip".to_owned());
        assert!(e.to_string().contains("kjv-theme-1.0.0.zip"));
    }

    #[test]
    fn store_error_from_io() {
        let e: StoreError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(e.to_string().starts_with("store I/O error"));
    }
}
