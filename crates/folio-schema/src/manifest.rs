use crate::types::ExtensionName;
use crate::version::Version;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Top-level manifest fields, in the order their absence is reported.
pub const REQUIRED_FIELDS: [&str; 6] = ["name", "version", "type", "description", "author", "files"];

static LANG_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}(-[A-Z]{2})?(-[a-z]+)?$").expect("valid language code pattern")
});

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid JSON in manifest.json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("manifest must be a JSON object")]
    NotAnObject,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid type '{0}', must be one of: theme, mapping, localization, bundle")]
    InvalidType(String),
    #[error("'files' must be an object mapping categories to lists of filenames")]
    MalformedFiles,
    #[error("invalid language fields: {0}")]
    InvalidLanguageSpec(#[from] LanguageSpecError),
    #[error(
        "extension type '{kind}' cannot contain '{category}' files, allowed: {}",
        join_categories(.allowed)
    )]
    DisallowedCategory {
        kind: ExtensionType,
        category: String,
        allowed: &'static [FileCategory],
    },
    #[error(
        "extension type '{kind}' must declare at least one file in: {}",
        join_categories(.allowed)
    )]
    NoDeclaredFiles {
        kind: ExtensionType,
        allowed: &'static [FileCategory],
    },
    #[error("invalid version format '{0}', use X.Y.Z")]
    InvalidVersion(String),
    #[error("'{0}' must be a string")]
    MalformedField(&'static str),
    #[error("invalid extension name '{0}': use 1-64 characters from [A-Za-z0-9._-], not starting with '.'")]
    InvalidName(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LanguageSpecError {
    #[error("both 'languages' and 'lang_codes' must be provided together")]
    Unpaired,
    #[error("'languages' and 'lang_codes' must be arrays of strings")]
    NotArrays,
    #[error("'languages' has {languages} entries but 'lang_codes' has {codes}")]
    LengthMismatch { languages: usize, codes: usize },
    #[error("'lang_codes' cannot be empty")]
    Empty,
    #[error("invalid BCP47 language code: '{0}'")]
    InvalidCode(String),
}

/// Closed set of extension kinds; each constrains which file categories it may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionType {
    Theme,
    Mapping,
    Localization,
    Bundle,
}

impl ExtensionType {
    pub const ALL: [ExtensionType; 4] = [
        ExtensionType::Theme,
        ExtensionType::Mapping,
        ExtensionType::Localization,
        ExtensionType::Bundle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExtensionType::Theme => "theme",
            ExtensionType::Mapping => "mapping",
            ExtensionType::Localization => "localization",
            ExtensionType::Bundle => "bundle",
        }
    }

    pub fn allowed_categories(self) -> &'static [FileCategory] {
        match self {
            ExtensionType::Theme => &[FileCategory::Themes],
            ExtensionType::Mapping => &[FileCategory::Mappings],
            ExtensionType::Localization => &[FileCategory::Resources],
            ExtensionType::Bundle => &[
                FileCategory::Mappings,
                FileCategory::Resources,
                FileCategory::Themes,
            ],
        }
    }

    pub fn allows(self, category: &str) -> bool {
        self.allowed_categories()
            .iter()
            .any(|c| c.as_str() == category)
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionType {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ManifestError::InvalidType(s.to_owned()))
    }
}

/// Kind of content file a manifest can declare under `files`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileCategory {
    Mappings,
    Themes,
    Resources,
}

impl FileCategory {
    /// Audit order.
    pub const ALL: [FileCategory; 3] = [
        FileCategory::Mappings,
        FileCategory::Themes,
        FileCategory::Resources,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Mappings => "mappings",
            FileCategory::Themes => "themes",
            FileCategory::Resources => "resources",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_categories(categories: &[FileCategory]) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The manifest `files` table: category key → ordered filenames.
///
/// Keys are kept as declared so that unknown categories survive into the
/// registry entry; only non-empty ones take part in the category checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclaredFiles(BTreeMap<String, Vec<String>>);

impl DeclaredFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and fixtures.
    #[must_use]
    pub fn with(mut self, category: &str, files: &[&str]) -> Self {
        self.0.insert(
            category.to_owned(),
            files.iter().map(|f| (*f).to_owned()).collect(),
        );
        self
    }

    fn from_value(value: &Value) -> Result<Self, ManifestError> {
        let table = value.as_object().ok_or(ManifestError::MalformedFiles)?;
        let mut out = BTreeMap::new();
        for (category, files) in table {
            let names = files
                .as_array()
                .and_then(|list| string_list(list))
                .ok_or(ManifestError::MalformedFiles)?;
            out.insert(category.clone(), names);
        }
        Ok(Self(out))
    }

    pub fn get(&self, category: FileCategory) -> &[String] {
        self.0.get(category.as_str()).map_or(&[][..], Vec::as_slice)
    }

    pub fn non_empty_categories(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(category, _)| category.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn file_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// Paired display names and BCP47-like codes. Both lists always exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSpec {
    languages: Vec<String>,
    lang_codes: Vec<String>,
}

impl LanguageSpec {
    pub fn new(languages: Vec<String>, lang_codes: Vec<String>) -> Result<Self, LanguageSpecError> {
        if languages.len() != lang_codes.len() {
            return Err(LanguageSpecError::LengthMismatch {
                languages: languages.len(),
                codes: lang_codes.len(),
            });
        }
        if lang_codes.is_empty() {
            return Err(LanguageSpecError::Empty);
        }
        if let Some(bad) = lang_codes.iter().find(|code| !LANG_CODE.is_match(code)) {
            return Err(LanguageSpecError::InvalidCode(bad.clone()));
        }
        Ok(Self {
            languages,
            lang_codes,
        })
    }

    fn from_fields(
        languages: Option<&Value>,
        lang_codes: Option<&Value>,
    ) -> Result<Option<Self>, LanguageSpecError> {
        match (languages, lang_codes) {
            (None, None) => Ok(None),
            (Some(languages), Some(lang_codes)) => {
                let languages = languages.as_array().and_then(|l| string_list(l));
                let lang_codes = lang_codes.as_array().and_then(|l| string_list(l));
                let (Some(languages), Some(lang_codes)) = (languages, lang_codes) else {
                    return Err(LanguageSpecError::NotArrays);
                };
                Self::new(languages, lang_codes).map(Some)
            }
            _ => Err(LanguageSpecError::Unpaired),
        }
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn lang_codes(&self) -> &[String] {
        &self.lang_codes
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.languages
            .iter()
            .zip(&self.lang_codes)
            .map(|(l, c)| (l.as_str(), c.as_str()))
    }
}

/// A validated extension manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: ExtensionName,
    pub version: Version,
    pub kind: ExtensionType,
    pub description: String,
    pub author: String,
    pub files: DeclaredFiles,
    pub languages: Option<LanguageSpec>,
}

impl Manifest {
    /// Validate a parsed `manifest.json` document.
    ///
    /// Checks run in a fixed order and the first failure is returned: object
    /// shape, required fields, type, files table, language fields, category
    /// rules, version, then the display strings and name.
    pub fn from_value(value: &Value) -> Result<Self, ManifestError> {
        let doc = value.as_object().ok_or(ManifestError::NotAnObject)?;

        for field in REQUIRED_FIELDS {
            if present(doc, field).is_none() {
                return Err(ManifestError::MissingField(field));
            }
        }
        let kind = match &value["type"] {
            Value::String(s) => s.parse::<ExtensionType>()?,
            other => return Err(ManifestError::InvalidType(other.to_string())),
        };

        let files = DeclaredFiles::from_value(&value["files"])?;

        let languages =
            LanguageSpec::from_fields(present(doc, "languages"), present(doc, "lang_codes"))?;

        let allowed = kind.allowed_categories();
        if let Some(category) = files.non_empty_categories().find(|c| !kind.allows(c)) {
            return Err(ManifestError::DisallowedCategory {
                kind,
                category: category.to_owned(),
                allowed,
            });
        }
        if allowed.iter().all(|c| files.get(*c).is_empty()) {
            return Err(ManifestError::NoDeclaredFiles { kind, allowed });
        }

        let version = match &value["version"] {
            Value::String(s) => s
                .parse::<Version>()
                .map_err(|_| ManifestError::InvalidVersion(s.clone()))?,
            other => return Err(ManifestError::InvalidVersion(other.to_string())),
        };

        let name = string_field(doc, "name")?;
        validate_extension_name(&name)?;

        Ok(Self {
            name: ExtensionName::new(name),
            version,
            kind,
            description: string_field(doc, "description")?,
            author: string_field(doc, "author")?,
            files,
            languages,
        })
    }

    /// Archive file name this manifest is stored under, e.g. `kjv-theme-1.0.0.zip`.
    pub fn artifact_file_name(&self, extension: &str) -> String {
        format!("{}-{}.{extension}", self.name, self.version)
    }
}

/// Parse and validate raw `manifest.json` bytes.
pub fn parse_manifest_slice(data: &[u8]) -> Result<Manifest, ManifestError> {
    let value: Value = serde_json::from_slice(data)?;
    Manifest::from_value(&value)
}

pub fn validate_extension_name(name: &str) -> Result<(), ManifestError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
    if valid {
        Ok(())
    } else {
        Err(ManifestError::InvalidName(name.to_owned()))
    }
}

fn present<'a>(doc: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    doc.get(field).filter(|v| !v.is_null())
}

fn string_field(doc: &Map<String, Value>, field: &'static str) -> Result<String, ManifestError> {
    present(doc, field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ManifestError::MalformedField(field))
}

fn string_list(values: &[Value]) -> Option<Vec<String>> {
    values
        .iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect()
}
