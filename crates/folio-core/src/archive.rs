use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

/// Name of the manifest entry every extension archive must carry.
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Largest uncompressed entry the reader will load (100 MiB).
pub const MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid archive: {0}")]
    Zip(#[from] ZipError),
    #[error("no such entry: {0}")]
    EntryNotFound(String),
    #[error("entry {name} too large ({size} bytes, max {max} bytes)")]
    EntryTooLarge { name: String, size: u64, max: u64 },
}

/// Read access to the entries of a packaged extension.
///
/// Entry names are matched exactly and case-sensitively; directories are
/// not listed.
pub trait ExtensionArchive {
    fn entry_names(&self) -> &[String];

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError>;

    fn contains(&self, name: &str) -> bool {
        self.entry_names().iter().any(|n| n == name)
    }
}

/// An extension archive backed by a zip file on disk.
pub struct ZipExtensionArchive {
    inner: ZipArchive<File>,
    names: Vec<String>,
}

impl ZipExtensionArchive {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        let mut inner = ZipArchive::new(file)?;
        let mut names = Vec::with_capacity(inner.len());
        for i in 0..inner.len() {
            let entry = inner.by_index(i)?;
            if !entry.is_dir() {
                names.push(entry.name().to_owned());
            }
        }
        Ok(Self { inner, names })
    }
}

impl ExtensionArchive for ZipExtensionArchive {
    fn entry_names(&self) -> &[String] {
        &self.names
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let mut entry = match self.inner.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(ArchiveError::EntryNotFound(name.to_owned())),
            Err(e) => return Err(e.into()),
        };
        let too_large = |size| ArchiveError::EntryTooLarge {
            name: name.to_owned(),
            size,
            max: MAX_ENTRY_SIZE,
        };
        if entry.size() > MAX_ENTRY_SIZE {
            return Err(too_large(entry.size()));
        }
        let mut buf = Vec::new();
        (&mut entry)
            .take(MAX_ENTRY_SIZE + 1)
            .read_to_end(&mut buf)?;
        if buf.len() as u64 > MAX_ENTRY_SIZE {
            return Err(too_large(buf.len() as u64));
        }
        Ok(buf)
    }
}
