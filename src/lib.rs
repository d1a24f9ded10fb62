#![forbid(unsafe_code)]

//! @acp:module "Go Build Tags Library"
//! @acp:summary "Which package identifiers are only available under which build tags"
//! @acp:domain analysis
//! @acp:layer api
//! @acp:stability stable
//!
//! # go-buildtags
//!
//! Given the files of one Go package, some guarded by `// +build`
//! directives, works out which top-level functions, methods, types,
//! constants and variables exist only under which active tags. The result
//! feeds documentation renderers that show "available under tag X".
//!
//! ## Pipeline
//!
//! - **Sanitize**: `//line` directives are blanked before parsing
//! - **Load**: files are read through a [`vfs::FileSystem`] and parsed by a [`SourceParser`]
//! - **Extract**: `+build` comments yield the active tags each file mentions
//! - **Map**: each tag's files are re-parsed and their declarations annotated
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use buildtags::{BuildContext, Corpus, MapFileSystem};
//!
//! let fs: MapFileSystem = [
//!     ("src/bar.go", "package bar\n"),
//!     ("src/xtag1.go", "// +build xtag1\n\npackage bar\n\nfunc First() {}\n"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let corpus = Corpus::new(Arc::new(fs));
//! let files = corpus.parse_files("", "/src", &["bar.go", "xtag1.go"])?;
//! let ctx = BuildContext::new(["xtag1"]);
//!
//! let tags = corpus.map_identifiers_to_tags(&files, "", "/src", &ctx)?;
//! assert_eq!(tags.get("First"), Some("xtag1"));
//! # Ok::<(), buildtags::BuildTagError>(())
//! ```

pub mod ast;
pub mod config;
pub mod corpus;
pub mod error;
pub mod parse;
pub mod tags;
pub mod vfs;

// Re-exports
pub use ast::{
    Comment, CommentGroup, Decl, DeclarationKey, GenKind, GoParser, SourceParser, Spec,
    SyntaxTree, TypeExpr,
};
pub use config::BuildContext;
pub use corpus::Corpus;
pub use error::{BuildTagError, Result};
pub use parse::{blank_line_directives, FileLoader};
pub use tags::{find_build_tags, IdentifierTagMapper, TagAnnotations, TagToFiles};
pub use vfs::{FileSystem, MapFileSystem, OsFileSystem};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
