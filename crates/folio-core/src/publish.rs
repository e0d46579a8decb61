use crate::archive::{ExtensionArchive, ZipExtensionArchive, MANIFEST_ENTRY};
use crate::audit::audit;
use crate::concurrency::RepoLock;
use crate::config::RepoConfig;
use crate::confirm::{Confirm, Prompt};
use crate::scripts::{write_commit_scripts, CommitScripts, FinalizeAction};
use crate::{ConflictKind, CoreError};
use chrono::Utc;
use folio_registry::{
    digest_file, reconcile, utc_timestamp, ArtifactDigest, ArtifactStore, Reconciliation,
    RegistryEntry, RegistryStore, RepoLayout,
};
use folio_schema::Manifest;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of a dry-run validation.
#[derive(Debug, Clone)]
pub struct ValidationSummary {
    pub manifest: Manifest,
    /// Name the archive will be stored under.
    pub artifact_name: String,
    pub digest: ArtifactDigest,
    /// Number of declared content files audited.
    pub files_checked: usize,
}

/// Everything a caller needs to report a successful publish.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub entry: RegistryEntry,
    pub decision: Reconciliation,
    pub artifact_path: PathBuf,
    pub removed_previous: Option<PathBuf>,
    pub registry_path: PathBuf,
    pub scripts: CommitScripts,
    pub finalize: FinalizeAction,
}

/// Extract and validate `manifest.json` from an open archive.
pub fn read_manifest(archive: &mut dyn ExtensionArchive) -> Result<Manifest, CoreError> {
    if !archive.contains(MANIFEST_ENTRY) {
        return Err(CoreError::NoManifest);
    }
    let data = archive.read_entry(MANIFEST_ENTRY)?;
    let value: Value = serde_json::from_slice(&data).map_err(CoreError::InvalidManifestJson)?;
    Ok(Manifest::from_value(&value)?)
}

/// Drives validation and admission of extension archives into one repository.
pub struct Publisher {
    layout: RepoLayout,
    config: RepoConfig,
}

impl Publisher {
    /// Open the repository at `root`, reading `folio.toml` if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root: PathBuf = root.into();
        let config = RepoConfig::load(&root)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: impl Into<PathBuf>, config: RepoConfig) -> Self {
        let root: PathBuf = root.into();
        Self {
            layout: config.layout(&root),
            config,
        }
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Run every check that does not touch the repository.
    pub fn validate(&self, archive_path: &Path) -> Result<ValidationSummary, CoreError> {
        if !archive_path.is_file() {
            return Err(CoreError::ArchiveNotFound(archive_path.to_path_buf()));
        }
        debug!("opening {}", archive_path.display());
        let mut archive = ZipExtensionArchive::open(archive_path)?;

        let manifest = read_manifest(&mut archive)?;
        info!(
            "manifest valid: {} v{} ({})",
            manifest.name, manifest.version, manifest.kind
        );

        let report = audit(&mut archive, &manifest);
        if !report.is_clean() {
            return Err(CoreError::ContentErrors(report.into_errors()));
        }
        let files_checked = report.checked;

        let digest = digest_file(archive_path)?;
        debug!("sha256 {} size {}", digest.sha256, digest.size);

        let extension = archive_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("zip");
        Ok(ValidationSummary {
            artifact_name: manifest.artifact_file_name(extension),
            manifest,
            digest,
            files_checked,
        })
    }

    /// Validate `archive_path` and admit it into the registry.
    ///
    /// Stops at the first failure. Nothing already written is rolled back.
    pub fn publish(
        &self,
        archive_path: &Path,
        confirm: &mut dyn Confirm,
    ) -> Result<PublishOutcome, CoreError> {
        let summary = self.validate(archive_path)?;
        self.admit(archive_path, &summary, confirm)
    }

    /// Admit an archive that already passed [`validate`](Self::validate).
    pub fn admit(
        &self,
        archive_path: &Path,
        summary: &ValidationSummary,
        confirm: &mut dyn Confirm,
    ) -> Result<PublishOutcome, CoreError> {
        let manifest = &summary.manifest;
        let incoming = manifest.version.to_string();

        self.layout.initialize()?;
        let _lock = RepoLock::acquire(&self.layout)?;

        let store = RegistryStore::new(self.layout.clone());
        let artifacts = ArtifactStore::new(self.layout.clone());
        let mut registry = store.load_or_init(Utc::now())?;

        let decision = reconcile(&registry, &manifest.name, &manifest.version);
        let mut removed_previous = None;
        match &decision {
            Reconciliation::Accept => info!("new extension {}", manifest.name),
            Reconciliation::Stale { existing } | Reconciliation::Duplicate { existing } => {
                let kind = if matches!(decision, Reconciliation::Duplicate { .. }) {
                    ConflictKind::Duplicate
                } else {
                    ConflictKind::Stale
                };
                let prompt = Prompt::OverrideConflict {
                    name: manifest.name.to_string(),
                    existing: existing.version.clone(),
                    incoming: incoming.clone(),
                    same_version: kind == ConflictKind::Duplicate,
                };
                if !confirm.confirm(&prompt) {
                    return Err(CoreError::RegistryConflict {
                        name: manifest.name.to_string(),
                        existing: existing.version.clone(),
                        incoming,
                        kind,
                    });
                }
                warn!(
                    "overriding {} v{} with {} v{incoming}",
                    manifest.name, existing.version, kind
                );
            }
            Reconciliation::Supersede { existing } => {
                info!(
                    "updating {} from v{} to v{incoming}",
                    manifest.name, existing.version
                );
                let old = existing.artifact_file_name();
                let prompt = Prompt::RemovePrevious {
                    name: manifest.name.to_string(),
                    file: old.clone(),
                };
                if old != summary.artifact_name && confirm.confirm(&prompt) {
                    match artifacts.remove(&old) {
                        Ok(true) => removed_previous = Some(self.layout.artifact_path(&old)),
                        Ok(false) => debug!("previous artifact {old} already gone"),
                        Err(e) => warn!("could not remove previous artifact {old}: {e}"),
                    }
                }
            }
        }

        let artifact_path = self.layout.artifact_path(&summary.artifact_name);
        if artifacts.exists(&summary.artifact_name) {
            let prompt = Prompt::Overwrite {
                path: self.layout.artifact_rel_path(&summary.artifact_name),
            };
            if !confirm.confirm(&prompt) {
                return Err(CoreError::Cancelled(format!(
                    "{} already exists",
                    artifact_path.display()
                )));
            }
        }
        artifacts.put(archive_path, &summary.artifact_name)?;
        info!("copied to {}", artifact_path.display());

        let now = Utc::now();
        let entry = RegistryEntry {
            name: manifest.name.clone(),
            version: incoming.clone(),
            kind: manifest.kind.into(),
            description: manifest.description.clone(),
            author: manifest.author.clone(),
            files: manifest.files.clone(),
            download_url: self
                .config
                .download_url(&self.layout, &summary.artifact_name),
            size: summary.digest.size,
            sha256: summary.digest.sha256.clone(),
            published_date: utc_timestamp(now),
            languages: manifest.languages.as_ref().map(|l| l.languages().to_vec()),
            lang_codes: manifest.languages.as_ref().map(|l| l.lang_codes().to_vec()),
        };
        registry.upsert(entry.clone(), now);
        store.save(&registry)?;
        info!("updated {}", self.layout.registry_file());

        let scripts = write_commit_scripts(&self.layout, &manifest.name, &incoming)?;
        let finalize = FinalizeAction::for_current_platform(&self.layout, &scripts);

        Ok(PublishOutcome {
            entry,
            decision,
            artifact_path,
            removed_previous,
            registry_path: self.layout.registry_path(),
            scripts,
            finalize,
        })
    }
}
