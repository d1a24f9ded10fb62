//! @acp:module "File Loader"
//! @acp:summary "Read, sanitize and parse package source files"
//! @acp:domain analysis
//! @acp:layer service
//!
//! Every load goes read -> [`blank_line_directives`] -> parse, with
//! comments retained. Any failure is returned as-is; there are no partial
//! results.

pub mod sanitize;

pub use sanitize::{blank_line_directives, LINE_DIRECTIVE};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ast::{SourceParser, SyntaxTree};
use crate::error::{BuildTagError, Result};
use crate::vfs::{self, FileSystem};

/// @acp:summary "Loads syntax trees through the filesystem and parser capabilities"
#[derive(Clone)]
pub struct FileLoader {
    fs: Arc<dyn FileSystem>,
    parser: Arc<dyn SourceParser>,
}

impl FileLoader {
    pub fn new(fs: Arc<dyn FileSystem>, parser: Arc<dyn SourceParser>) -> Self {
        Self { fs, parser }
    }

    /// @acp:summary "Load and parse a single file"
    pub fn parse_file(&self, path: &str) -> Result<SyntaxTree> {
        let mut src = self.fs.read_file(path).map_err(|source| BuildTagError::Read {
            path: path.to_string(),
            source,
        })?;

        blank_line_directives(&mut src);

        self.parser.parse(path, &src)
    }

    /// @acp:summary "Load a list of files from one directory"
    /// Each name is read from `abs_path` and keyed by the same name joined
    /// onto `rel_path`. Stops at the first failure.
    pub fn parse_files<S: AsRef<str>>(
        &self,
        rel_path: &str,
        abs_path: &str,
        names: &[S],
    ) -> Result<BTreeMap<String, SyntaxTree>> {
        let mut files = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            let tree = self.parse_file(&vfs::join(abs_path, name))?;
            files.insert(vfs::join(rel_path, name), tree);
        }
        Ok(files)
    }
}

impl std::fmt::Debug for FileLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLoader").finish_non_exhaustive()
    }
}
