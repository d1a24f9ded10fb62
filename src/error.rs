//! @acp:module "Errors"
//! @acp:summary "Error types for file loading, parsing and tag mapping"
//! @acp:domain analysis
//! @acp:layer model

use std::path::PathBuf;

use thiserror::Error;

/// @acp:summary "Main error type for build tag analysis"
///
/// `Read`, `Parse` and `Language` are the read-or-parse failures of a single
/// file. `TagGroup` wraps one of them with the tag group that was being
/// re-loaded when it happened.
#[derive(Debug, Error)]
pub enum BuildTagError {
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("{source} in {abs_path:?} with files: {files:?}")]
    TagGroup {
        tag: String,
        abs_path: String,
        files: Vec<String>,
        #[source]
        source: Box<BuildTagError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildTagError {
    /// True when the underlying failure is a missing file
    pub fn is_not_found(&self) -> bool {
        match self {
            BuildTagError::Read { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            BuildTagError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            BuildTagError::TagGroup { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Path of the file that failed to read or parse, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            BuildTagError::Read { path, .. } | BuildTagError::Parse { path, .. } => Some(path),
            BuildTagError::TagGroup { source, .. } => source.path(),
            _ => None,
        }
    }
}

/// Result type using BuildTagError
pub type Result<T> = std::result::Result<T, BuildTagError>;
