use crate::layout::RepoLayout;
use crate::{fsync_dir, StoreError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Flat directory of published extension archives.
///
/// Files are addressed by plain file name; writes go through a temp file in
/// the same directory and are renamed into place.
pub struct ArtifactStore {
    layout: RepoLayout,
}

fn check_name(file_name: &str) -> Result<(), StoreError> {
    let bad = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\']);
    if bad {
        return Err(StoreError::InvalidArtifactName(file_name.to_owned()));
    }
    Ok(())
}

impl ArtifactStore {
    pub fn new(layout: RepoLayout) -> Self {
        Self { layout }
    }

    pub fn path(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        check_name(file_name)?;
        Ok(self.layout.artifact_path(file_name))
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.path(file_name).is_ok_and(|p| p.is_file())
    }

    /// Copy `source` into the store as `file_name`, replacing any existing file.
    pub fn put(&self, source: &Path, file_name: &str) -> Result<PathBuf, StoreError> {
        let dest = self.path(file_name)?;
        let dir = self.layout.extensions_dir();
        fs::create_dir_all(&dir)?;

        let mut input = fs::File::open(source)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        io::copy(&mut input, tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        debug!("stored artifact {}", dest.display());
        Ok(dest)
    }

    /// Remove an artifact. Returns `Ok(false)` if it was already gone.
    pub fn remove(&self, file_name: &str) -> Result<bool, StoreError> {
        let path = self.path(file_name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed artifact {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.layout.extensions_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let layout = RepoLayout::new(dir.path());
        layout.initialize().unwrap();
        (dir, ArtifactStore::new(layout))
    }

    fn source(dir: &Path, content: &[u8]) -> PathBuf {
        let p = dir.join("upload.zip");
        fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn put_copies_and_keeps_source() {
        let (dir, store) = test_store();
        let src = source(dir.path(), b"PK archive bytes");
        let dest = store.put(&src, "kjv-theme-1.0.0.zip").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"PK archive bytes");
        assert!(src.exists());
        assert!(store.exists("kjv-theme-1.0.0.zip"));
    }

    #[test]
    fn put_replaces_existing() {
        let (dir, store) = test_store();
        let src = source(dir.path(), b"one");
        store.put(&src, "a-1.0.0.zip").unwrap();
        fs::write(&src, b"two").unwrap();
        let dest = store.put(&src, "a-1.0.0.zip").unwrap();
        assert_eq!(fs::read(dest).unwrap(), b"two");
    }

    #[test]
    fn remove_missing_is_not_an_error() {
        let (_dir, store) = test_store();
        assert!(!store.remove("ghost-1.0.0.zip").unwrap());
    }

    #[test]
    fn remove_existing() {
        let (dir, store) = test_store();
        let src = source(dir.path(), b"x");
        store.put(&src, "a-1.0.0.zip").unwrap();
        assert!(store.remove("a-1.0.0.zip").unwrap());
        assert!(!store.exists("a-1.0.0.zip"));
    }

    #[test]
    fn rejects_path_like_names() {
        let (dir, store) = test_store();
        let src = source(dir.path(), b"x");
        for bad in ["", "../escape.zip", "sub/dir.zip", "win\\dir.zip", ".", ".."] {
            assert!(
                matches!(store.put(&src, bad), Err(StoreError::InvalidArtifactName(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn list_is_sorted_and_skips_hidden() {
        let (dir, store) = test_store();
        let src = source(dir.path(), b"x");
        store.put(&src, "b-1.0.0.zip").unwrap();
        store.put(&src, "a-1.0.0.zip").unwrap();
        fs::write(dir.path().join("extensions/.tmp"), b"").unwrap();
        assert_eq!(store.list().unwrap(), ["a-1.0.0.zip", "b-1.0.0.zip"]);
    }
}
