//! Cross-checks the files a manifest declares against what the archive holds.

use crate::archive::{ArchiveError, ExtensionArchive};
use folio_schema::{
    validate_mapping, validate_properties, validate_theme, ContentError, FileCategory, Manifest,
};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static MAPPING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*_mapping\.json$").expect("valid mapping name pattern"));
static THEME_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^.*\.json$").expect("valid theme name pattern"));
static RESOURCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(messages|gui)_[a-z]{2}(_[A-Z]{2})?\.properties$")
        .expect("valid resource name pattern")
});

fn name_rule(category: FileCategory) -> (&'static Regex, &'static str) {
    match category {
        FileCategory::Mappings => (&*MAPPING_NAME, "*_mapping.json"),
        FileCategory::Themes => (&*THEME_NAME, "*.json"),
        FileCategory::Resources => (
            &*RESOURCE_NAME,
            "(messages|gui)_<lang>[_<COUNTRY>].properties",
        ),
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{category} file '{file}' must follow pattern: {pattern}")]
    FilenamePatternMismatch {
        category: FileCategory,
        file: String,
        pattern: &'static str,
    },
    #[error("{category} file not found in archive: {file}")]
    FileNotFound { category: FileCategory, file: String },
    #[error("{file}: {source}")]
    InvalidContent { file: String, source: ContentError },
    #[error("{file}: invalid JSON: {source}")]
    InvalidJson {
        file: String,
        source: serde_json::Error,
    },
    #[error("error reading {file}: {source}")]
    UnreadableEntry { file: String, source: ArchiveError },
}

impl AuditError {
    pub fn file(&self) -> &str {
        match self {
            Self::FilenamePatternMismatch { file, .. }
            | Self::FileNotFound { file, .. }
            | Self::InvalidContent { file, .. }
            | Self::InvalidJson { file, .. }
            | Self::UnreadableEntry { file, .. } => file,
        }
    }
}

/// Every problem found in one archive, in audit order.
#[derive(Debug, Default)]
pub struct AuditReport {
    pub checked: usize,
    pub errors: Vec<AuditError>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<AuditError> {
        self.errors
    }
}

/// Audit every declared file. Never stops at the first problem.
///
/// Categories are visited as mappings, themes, resources; files in the order
/// the manifest lists them. A name that fails its pattern is not looked up.
pub fn audit(archive: &mut dyn ExtensionArchive, manifest: &Manifest) -> AuditReport {
    let mut report = AuditReport::default();

    for category in FileCategory::ALL {
        let (pattern, shape) = name_rule(category);
        for file in manifest.files.get(category) {
            report.checked += 1;
            if !pattern.is_match(file) {
                report.errors.push(AuditError::FilenamePatternMismatch {
                    category,
                    file: file.clone(),
                    pattern: shape,
                });
                continue;
            }
            if !archive.contains(file) {
                report.errors.push(AuditError::FileNotFound {
                    category,
                    file: file.clone(),
                });
                continue;
            }
            if let Err(e) = check_entry(archive, category, file) {
                report.errors.push(e);
            }
        }
    }

    debug!(
        "audited {} declared files, {} problems",
        report.checked,
        report.errors.len()
    );
    report
}

fn check_entry(
    archive: &mut dyn ExtensionArchive,
    category: FileCategory,
    file: &str,
) -> Result<(), AuditError> {
    let data = archive
        .read_entry(file)
        .map_err(|source| AuditError::UnreadableEntry {
            file: file.to_owned(),
            source,
        })?;

    let checked = match category {
        FileCategory::Resources => validate_properties(&data),
        FileCategory::Mappings | FileCategory::Themes => {
            let doc: Value =
                serde_json::from_slice(&data).map_err(|source| AuditError::InvalidJson {
                    file: file.to_owned(),
                    source,
                })?;
            if category == FileCategory::Mappings {
                validate_mapping(&doc)
            } else {
                validate_theme(&doc)
            }
        }
    };
    checked.map_err(|source| AuditError::InvalidContent {
        file: file.to_owned(),
        source,
    })
}
