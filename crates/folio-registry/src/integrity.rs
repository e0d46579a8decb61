use crate::artifacts::ArtifactStore;
use crate::layout::RepoLayout;
use crate::registry::Registry;
use crate::StoreError;
use folio_schema::Sha256Hex;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// SHA-256 and byte length of one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigest {
    pub sha256: Sha256Hex,
    pub size: u64,
}

pub fn digest_bytes(data: &[u8]) -> ArtifactDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ArtifactDigest {
        sha256: Sha256Hex::new(format!("{:x}", hasher.finalize())),
        size: data.len() as u64,
    }
}

/// Stream a file through SHA-256 without loading it whole.
pub fn digest_file(path: &Path) -> Result<ArtifactDigest, StoreError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    Ok(ArtifactDigest {
        sha256: Sha256Hex::new(format!("{:x}", hasher.finalize())),
        size,
    })
}

#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub checked: usize,
    pub passed: usize,
    pub failed: Vec<IntegrityFailure>,
    /// Artifact files with no registry entry pointing at them.
    pub orphaned: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub struct IntegrityFailure {
    pub name: String,
    pub reason: String,
}

/// Recompute digest and size of every registered artifact.
pub fn verify_registry_integrity(
    layout: &RepoLayout,
    registry: &Registry,
) -> Result<IntegrityReport, StoreError> {
    let store = ArtifactStore::new(layout.clone());
    let mut report = IntegrityReport {
        checked: registry.len(),
        ..Default::default()
    };
    let mut referenced = BTreeSet::new();

    for entry in &registry.extensions {
        let file_name = entry.artifact_file_name();
        referenced.insert(file_name.clone());

        let path = match store.path(&file_name) {
            Ok(p) => p,
            Err(e) => {
                report.failed.push(IntegrityFailure {
                    name: entry.name.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !path.is_file() {
            report.failed.push(IntegrityFailure {
                name: entry.name.to_string(),
                reason: format!("artifact missing: {file_name}"),
            });
            continue;
        }

        match digest_file(&path) {
            Ok(d) if d.sha256 != entry.sha256 => report.failed.push(IntegrityFailure {
                name: entry.name.to_string(),
                reason: format!("sha256 mismatch: expected {}, got {}", entry.sha256, d.sha256),
            }),
            Ok(d) if d.size != entry.size => report.failed.push(IntegrityFailure {
                name: entry.name.to_string(),
                reason: format!("size mismatch: expected {}, got {}", entry.size, d.size),
            }),
            Ok(_) => report.passed += 1,
            Err(e) => report.failed.push(IntegrityFailure {
                name: entry.name.to_string(),
                reason: format!("artifact read error: {e}"),
            }),
        }
    }

    report.orphaned = store
        .list()?
        .into_iter()
        .filter(|f| !referenced.contains(f))
        .collect();

    Ok(report)
}
