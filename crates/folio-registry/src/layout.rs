use crate::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REGISTRY_FILE: &str = "registry.json";
pub const DEFAULT_EXTENSIONS_DIR: &str = "extensions";
pub const DEFAULT_SCRIPTS_DIR: &str = "scripts";
const LOCK_FILE: &str = ".folio.lock";

/// Directory layout of an extensions repository.
///
/// The registry file, the flat artifact directory, and the generated commit
/// scripts all live directly under the repository root. Directories are
/// created lazily on [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct RepoLayout {
    root: PathBuf,
    registry_file: String,
    extensions_dir: String,
    scripts_dir: String,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            registry_file: DEFAULT_REGISTRY_FILE.to_owned(),
            extensions_dir: DEFAULT_EXTENSIONS_DIR.to_owned(),
            scripts_dir: DEFAULT_SCRIPTS_DIR.to_owned(),
        }
    }

    /// Override the repository-relative names of the registry file and directories.
    #[must_use]
    pub fn with_names(mut self, registry_file: &str, extensions_dir: &str, scripts_dir: &str) -> Self {
        registry_file.clone_into(&mut self.registry_file);
        extensions_dir.clone_into(&mut self.extensions_dir);
        scripts_dir.clone_into(&mut self.scripts_dir);
        self
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry_file)
    }

    /// Registry file name relative to the root, as staged by the commit scripts.
    #[inline]
    pub fn registry_file(&self) -> &str {
        &self.registry_file
    }

    #[inline]
    pub fn extensions_dir(&self) -> PathBuf {
        self.root.join(&self.extensions_dir)
    }

    /// Artifact directory name relative to the root.
    #[inline]
    pub fn extensions_dir_name(&self) -> &str {
        &self.extensions_dir
    }

    #[inline]
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.extensions_dir().join(file_name)
    }

    /// Repository-relative artifact path with forward slashes, used in download URLs.
    pub fn artifact_rel_path(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.extensions_dir)
    }

    #[inline]
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(&self.scripts_dir)
    }

    /// Scripts directory name relative to the root.
    #[inline]
    pub fn scripts_dir_name(&self) -> &str {
        &self.scripts_dir
    }

    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.extensions_dir())?;
        Ok(())
    }
}
