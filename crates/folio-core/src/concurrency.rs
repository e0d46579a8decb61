use crate::CoreError;
use folio_registry::RepoLayout;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::{debug, info};

/// Exclusive advisory lock on a repository's `.folio.lock`.
///
/// Held for the whole read-modify-write of the registry and artifact
/// directory; released when dropped.
pub struct RepoLock {
    lock_file: File,
}

fn lock_error(path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::Lock(format!("{}: {e}", path.display()))
}

impl RepoLock {
    /// Take the repository lock, waiting for a concurrent publish to finish first.
    pub fn acquire(layout: &RepoLayout) -> Result<Self, CoreError> {
        let path = layout.lock_file();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                info!(
                    "repository is locked by another publish, waiting for {}",
                    path.display()
                );
                file.lock_exclusive().map_err(|e| lock_error(&path, &e))?;
            }
            Err(e) => return Err(lock_error(&path, &e)),
        }
        debug!("acquired {}", path.display());
        Ok(Self { lock_file: file })
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
    }
}
