//! Manifest schema, version ordering, and typed content validation for Folio.
//!
//! This crate defines the schema layer: strongly-typed extension manifests
//! (`Manifest`) built from raw JSON with a fixed, deterministic check order,
//! the `Version` triple used for registry reconciliation, and the shape checks
//! for the three content-file kinds an archive may carry (mappings, themes,
//! and properties resources).

pub mod content;
pub mod manifest;
pub mod types;
pub mod version;

pub use content::{
    validate_mapping, validate_properties, validate_theme, ContentError, REQUIRED_STYLE_KEYS,
    REQUIRED_THEME_KEYS,
};
pub use manifest::{
    parse_manifest_slice, DeclaredFiles, ExtensionType, FileCategory, LanguageSpec,
    LanguageSpecError, Manifest, ManifestError, REQUIRED_FIELDS,
};
pub use types::{ExtensionName, Sha256Hex};
pub use version::{compare_versions, Version, VersionError};
