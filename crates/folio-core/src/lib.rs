//! Publishing engine for Folio extension repositories.
//!
//! This crate ties the schema checks and the registry store together into the
//! `Publisher`: it opens an extension archive, validates its manifest, audits
//! every declared content file, reconciles the submission against the
//! registry under an exclusive repository lock, stores the artifact, and
//! regenerates the commit scripts. Interactive decisions go through the
//! `Confirm` capability so that scripted callers can supply fixed answers.

pub mod archive;
pub mod audit;
pub mod concurrency;
pub mod config;
pub mod confirm;
pub mod publish;
pub mod scripts;

pub use archive::{
    ArchiveError, ExtensionArchive, ZipExtensionArchive, MANIFEST_ENTRY, MAX_ENTRY_SIZE,
};
pub use audit::{audit, AuditError, AuditReport};
pub use concurrency::RepoLock;
pub use config::{RepoConfig, CONFIG_FILE, DEFAULT_BASE_URL};
pub use confirm::{Confirm, FixedPolicy, Prompt};
pub use publish::{read_manifest, PublishOutcome, Publisher, ValidationSummary};
pub use scripts::{write_commit_scripts, CommitScripts, FinalizeAction};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a submission collided with the published entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Stale,
    Duplicate,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale => f.write_str("older version"),
            Self::Duplicate => f.write_str("same version"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("no {MANIFEST_ENTRY} found in archive")]
    NoManifest,
    #[error("invalid JSON in {MANIFEST_ENTRY}: {0}")]
    InvalidManifestJson(serde_json::Error),
    #[error("manifest validation failed: {0}")]
    Manifest(#[from] folio_schema::ManifestError),
    #[error("file validation failed with {} error(s)", .0.len())]
    ContentErrors(Vec<AuditError>),
    #[error("{name} v{existing} already published; v{incoming} is the {kind}")]
    RegistryConflict {
        name: String,
        existing: String,
        incoming: String,
        kind: ConflictKind,
    },
    #[error("publish cancelled: {0}")]
    Cancelled(String),
    #[error("store error: {0}")]
    Store(#[from] folio_registry::StoreError),
    #[error("lock error: {0}")]
    Lock(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
