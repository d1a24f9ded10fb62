//! @acp:module "Corpus"
//! @acp:summary "Entry point tying the filesystem, parser and tag mapper together"
//! @acp:domain analysis
//! @acp:layer api
//!
//! A corpus holds no per-call state: every mapping starts from fresh
//! structures, so one corpus can serve concurrent callers as long as its
//! filesystem tolerates concurrent reads.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ast::{GoParser, SourceParser, SyntaxTree};
use crate::config::BuildContext;
use crate::error::Result;
use crate::parse::FileLoader;
use crate::tags::{IdentifierTagMapper, TagAnnotations};
use crate::vfs::FileSystem;

/// @acp:summary "Package source access plus build tag analysis"
#[derive(Debug, Clone)]
pub struct Corpus {
    loader: FileLoader,
    mapper: IdentifierTagMapper,
}

impl Corpus {
    /// Corpus over `fs` using the Go parser
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_parser(fs, Arc::new(GoParser::new()))
    }

    pub fn with_parser(fs: Arc<dyn FileSystem>, parser: Arc<dyn SourceParser>) -> Self {
        let loader = FileLoader::new(fs, parser);
        Self {
            mapper: IdentifierTagMapper::new(loader.clone()),
            loader,
        }
    }

    pub fn parse_file(&self, path: &str) -> Result<SyntaxTree> {
        self.loader.parse_file(path)
    }

    /// @acp:summary "Parse `names` from `abs_path`, keyed under `rel_path`"
    pub fn parse_files<S: AsRef<str>>(
        &self,
        rel_path: &str,
        abs_path: &str,
        names: &[S],
    ) -> Result<BTreeMap<String, SyntaxTree>> {
        self.loader.parse_files(rel_path, abs_path, names)
    }

    /// @acp:summary "Annotate identifiers with the build tags they are available under"
    pub fn map_identifiers_to_tags(
        &self,
        files: &BTreeMap<String, SyntaxTree>,
        rel_path: &str,
        abs_path: &str,
        ctx: &BuildContext,
    ) -> Result<TagAnnotations> {
        self.mapper.map(files, rel_path, abs_path, ctx)
    }
}
