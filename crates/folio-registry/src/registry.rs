use crate::layout::RepoLayout;
use crate::{fsync_dir, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use folio_schema::{DeclaredFiles, ExtensionName, ExtensionType, Sha256Hex, Version, VersionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::debug;

/// Format tag written into freshly initialized registries.
pub const REGISTRY_FORMAT_VERSION: &str = "1.0";

/// RFC 3339 UTC timestamp with a trailing `Z`, e.g. `2026-10-16T09:30:00.123456Z`.
pub fn utc_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The `type` of a stored entry. Types this build does not know are kept verbatim
/// so that one odd entry does not make the whole registry unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryKind {
    Known(ExtensionType),
    Other(String),
}

impl EntryKind {
    pub fn known(&self) -> Option<ExtensionType> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(kind) => kind.as_str(),
            Self::Other(raw) => raw,
        }
    }
}

impl From<ExtensionType> for EntryKind {
    fn from(kind: ExtensionType) -> Self {
        Self::Known(kind)
    }
}

impl PartialEq<ExtensionType> for EntryKind {
    fn eq(&self, other: &ExtensionType) -> bool {
        self.known() == Some(*other)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published extension. Field order is the serialized order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: ExtensionName,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub description: String,
    pub author: String,
    pub files: DeclaredFiles,
    pub download_url: String,
    pub size: u64,
    pub sha256: Sha256Hex,
    pub published_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang_codes: Option<Vec<String>>,
}

impl RegistryEntry {
    pub fn parsed_version(&self) -> Result<Version, VersionError> {
        self.version.parse()
    }

    /// File name of the stored archive, taken from the last segment of `download_url`.
    pub fn artifact_file_name(&self) -> String {
        self.download_url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map_or_else(|| format!("{}-{}.zip", self.name, self.version), str::to_owned)
    }
}

/// The catalog of accepted extensions: unique by name, sorted by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registry {
    pub version: String,
    pub last_updated: String,
    #[serde(default)]
    pub extensions: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: REGISTRY_FORMAT_VERSION.to_owned(),
            last_updated: utc_timestamp(now),
            extensions: Vec::new(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&RegistryEntry> {
        self.extensions.iter().find(|e| e.name == name)
    }

    /// Replace any entry with the same name, re-sort, and stamp `last_updated`.
    pub fn upsert(&mut self, entry: RegistryEntry, now: DateTime<Utc>) {
        self.extensions.retain(|e| e.name != entry.name);
        self.extensions.push(entry);
        self.extensions.sort_by(|a, b| a.name.cmp(&b.name));
        self.last_updated = utc_timestamp(now);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, StoreError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut out = serde_json::to_vec_pretty(self)?;
        out.push(b'\n');
        Ok(out)
    }
}

/// Reads and atomically rewrites the registry file of a repository.
pub struct RegistryStore {
    layout: RepoLayout,
}

impl RegistryStore {
    pub fn new(layout: RepoLayout) -> Self {
        Self { layout }
    }

    pub fn exists(&self) -> bool {
        self.layout.registry_path().exists()
    }

    /// Load the registry, or `None` if the repository has none yet.
    pub fn load(&self) -> Result<Option<Registry>, StoreError> {
        let path = self.layout.registry_path();
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        Registry::from_bytes(&data).map(Some)
    }

    pub fn load_or_init(&self, now: DateTime<Utc>) -> Result<Registry, StoreError> {
        match self.load()? {
            Some(registry) => Ok(registry),
            None => {
                debug!(
                    "no registry at {}, starting a new one",
                    self.layout.registry_path().display()
                );
                Ok(Registry::new(now))
            }
        }
    }

    pub fn save(&self, registry: &Registry) -> Result<(), StoreError> {
        let dest = self.layout.registry_path();
        let dir = dest
            .parent()
            .map_or_else(|| self.layout.root().to_path_buf(), std::path::Path::to_path_buf);
        fs::create_dir_all(&dir)?;

        let content = registry.to_bytes()?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        debug!(
            "wrote registry with {} entries to {}",
            registry.len(),
            dest.display()
        );
        Ok(())
    }
}
