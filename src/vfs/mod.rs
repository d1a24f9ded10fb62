//! @acp:module "Virtual File System"
//! @acp:summary "Filesystem capability used to read package sources"
//! @acp:domain analysis
//! @acp:layer io
//!
//! Paths handed to a [`FileSystem`] are slash-separated and independent of
//! the host platform. [`OsFileSystem`] maps them under a root directory,
//! [`MapFileSystem`] serves them from memory.

mod path;

pub use path::{base, clean, join};

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

/// Read access to package source files
pub trait FileSystem: Send + Sync {
    /// Read the full contents of the file at `path`
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// @acp:summary "Filesystem rooted at a host directory"
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        // Rooting before cleaning keeps ".." from climbing above `root`
        let cleaned = key(path);
        let mut resolved = self.root.clone();
        for part in cleaned.split('/').filter(|p| !p.is_empty()) {
            resolved.push(part);
        }
        resolved
    }
}

impl FileSystem for OsFileSystem {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

/// @acp:summary "In-memory filesystem keyed by cleaned slash paths"
#[derive(Debug, Clone, Default)]
pub struct MapFileSystem {
    files: BTreeMap<String, Vec<u8>>,
}

impl MapFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert<P: AsRef<str>, C: Into<Vec<u8>>>(&mut self, path: P, contents: C) {
        self.files.insert(key(path.as_ref()), contents.into());
    }
}

impl<P: AsRef<str>, C: Into<Vec<u8>>> FromIterator<(P, C)> for MapFileSystem {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut fs = MapFileSystem::new();
        for (path, contents) in iter {
            fs.insert(path, contents);
        }
        fs
    }
}

impl FileSystem for MapFileSystem {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(&key(path)).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("file does not exist: {}", path))
        })
    }
}

// "src/a.go" and "/src/a.go" name the same entry
fn key(path: &str) -> String {
    clean(&format!("/{}", path))
}
