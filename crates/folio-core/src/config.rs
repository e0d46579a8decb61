use crate::CoreError;
use folio_registry::layout::{DEFAULT_EXTENSIONS_DIR, DEFAULT_REGISTRY_FILE, DEFAULT_SCRIPTS_DIR};
use folio_registry::RepoLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Repository settings file, looked up in the repository root.
pub const CONFIG_FILE: &str = "folio.toml";

pub const DEFAULT_BASE_URL: &str = "https://github.com/mybible-cli/mybible-cli-extensions/raw/main";

/// Per-repository settings. Every field is optional in `folio.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Prefix for download URLs; artifacts resolve to `{base_url}/{extensions_dir}/{file}`.
    pub base_url: String,
    pub registry_file: String,
    pub extensions_dir: String,
    pub scripts_dir: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            registry_file: DEFAULT_REGISTRY_FILE.to_owned(),
            extensions_dir: DEFAULT_EXTENSIONS_DIR.to_owned(),
            scripts_dir: DEFAULT_SCRIPTS_DIR.to_owned(),
        }
    }
}

impl RepoConfig {
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| CoreError::Config(format!("invalid {CONFIG_FILE}: {e}")))?;
        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        for (key, value) in [
            ("registry_file", &config.registry_file),
            ("extensions_dir", &config.extensions_dir),
            ("scripts_dir", &config.scripts_dir),
        ] {
            if value.is_empty() || value.contains("..") || Path::new(value).is_absolute() {
                return Err(CoreError::Config(format!(
                    "{key} must be a relative path inside the repository, got '{value}'"
                )));
            }
        }
        Ok(config)
    }

    /// Load `folio.toml` from `repo_root`, falling back to defaults when absent.
    pub fn load(repo_root: &Path) -> Result<Self, CoreError> {
        let path = repo_root.join(CONFIG_FILE);
        if !path.exists() {
            debug!("no {CONFIG_FILE} in {}, using defaults", repo_root.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn layout(&self, repo_root: &Path) -> RepoLayout {
        RepoLayout::new(repo_root).with_names(
            &self.registry_file,
            &self.extensions_dir,
            &self.scripts_dir,
        )
    }

    pub fn download_url(&self, layout: &RepoLayout, file_name: &str) -> String {
        format!("{}/{}", self.base_url, layout.artifact_rel_path(file_name))
    }
}
