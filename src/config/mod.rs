//! @acp:module "Configuration"
//! @acp:summary "Active build configuration: the tag universe recognized for one analysis pass"
//! @acp:domain analysis
//! @acp:layer config
//!
//! The build context is always passed explicitly into extraction and
//! mapping calls; nothing reads it from process-wide state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BuildTagError, Result};

/// @acp:summary "Recognized build tags for one analysis pass"
/// @acp:lock normal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildContext {
    /// Tags considered active, in caller order
    pub build_tags: Vec<String>,
}

impl BuildContext {
    /// Build a context from a tag list, dropping repeated tags
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut build_tags: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !build_tags.contains(&tag) {
                build_tags.push(tag);
            }
        }
        Self { build_tags }
    }

    /// @acp:summary "Load a build context from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ctx: BuildContext =
            serde_json::from_str(&content).map_err(|source| BuildTagError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(ctx.build_tags))
    }

    /// @acp:summary "Save the build context as pretty JSON"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether `tag` is part of the active configuration
    pub fn allows(&self, tag: &str) -> bool {
        self.build_tags.iter().any(|t| t == tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.build_tags
    }

    pub fn is_empty(&self) -> bool {
        self.build_tags.is_empty()
    }
}
