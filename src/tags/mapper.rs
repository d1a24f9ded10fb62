//! @acp:module "Identifier Tag Mapper"
//! @acp:summary "Map top-level identifiers to the build tags guarding their files"
//! @acp:domain analysis
//! @acp:layer service
//!
//! ## Algorithm
//!
//! 1. Classify every file by the active tags its directives mention
//! 2. Return an empty map if no file is tag-guarded
//! 3. Per tag (sorted), re-load exactly that tag's files as one batch
//! 4. Walk the batch's declarations and record the tag for each key
//! 5. Render every key's tags joined by `", "`
//!
//! Methods are keyed `Receiver.Name`. When a receiver type cannot be
//! rendered the method is recorded under its bare name.

use std::collections::BTreeMap;

use serde::Serialize;

use super::directive::find_build_tags;
use crate::ast::{Decl, DeclarationKey, Spec, SyntaxTree};
use crate::config::BuildContext;
use crate::error::{BuildTagError, Result};
use crate::parse::FileLoader;
use crate::vfs;

/// Separator between tags in a rendered annotation
pub const TAG_SEPARATOR: &str = ", ";

/// @acp:summary "Tag to file base names, both in deterministic order"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagToFiles {
    groups: BTreeMap<String, Vec<String>>,
}

impl TagToFiles {
    /// Classify `files` by the allowed tags their directives mention
    pub fn classify(files: &BTreeMap<String, SyntaxTree>, allowed_tags: &[String]) -> Self {
        let mut tag_files = TagToFiles::default();
        for (file_name, tree) in files {
            let Some(tags) = find_build_tags(tree, allowed_tags) else {
                continue;
            };
            tracing::debug!(
                file = %file_name,
                package = tree.package.as_deref().unwrap_or_default(),
                tags = ?tags,
                "build-tagged file"
            );
            let name = vfs::base(file_name);
            for tag in tags {
                tag_files.add(tag, &name);
            }
        }
        tag_files
    }

    fn add(&mut self, tag: String, file_name: &str) {
        let files = self.groups.entry(tag).or_default();
        if !files.iter().any(|f| f == file_name) {
            files.push(file_name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Files guarded by `tag`
    pub fn files(&self, tag: &str) -> Option<&[String]> {
        self.groups.get(tag).map(Vec::as_slice)
    }

    /// Iterate tags in sorted order with their files
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(t, f)| (t.as_str(), f.as_slice()))
    }
}

/// @acp:summary "Identifier to rendered tag list, the mapper's output"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagAnnotations {
    entries: BTreeMap<String, String>,
}

impl TagAnnotations {
    /// Tags for `key`, e.g. `"xtag2, xtag3"`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }

    /// Serialize as a flat JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Tag sets per key while a mapping is being built
#[derive(Debug, Default)]
struct TagAccumulator {
    keys: BTreeMap<String, Vec<String>>,
}

impl TagAccumulator {
    fn record(&mut self, key: DeclarationKey, tag: &str) {
        let tags = self.keys.entry(key.to_string()).or_default();
        if !tags.iter().any(|t| t == tag) {
            tracing::trace!(key = %key, tag, "identifier tagged");
            tags.push(tag.to_string());
        }
    }

    fn render(self) -> TagAnnotations {
        let entries = self
            .keys
            .into_iter()
            .map(|(key, tags)| (key, tags.join(TAG_SEPARATOR)))
            .collect();
        TagAnnotations { entries }
    }
}

/// @acp:summary "Builds identifier tag annotations for one package directory"
#[derive(Debug, Clone)]
pub struct IdentifierTagMapper {
    loader: FileLoader,
}

impl IdentifierTagMapper {
    pub fn new(loader: FileLoader) -> Self {
        Self { loader }
    }

    /// @acp:summary "Map identifiers declared in tag-guarded files to their tags"
    /// @acp:ai-careful "Re-parses each tag group from disk; failures abort the whole mapping"
    ///
    /// `files` are the package's already parsed files keyed by path; only
    /// their comments are inspected. Each tag's files are re-read from
    /// `abs_path` so every group is parsed in isolation.
    pub fn map(
        &self,
        files: &BTreeMap<String, SyntaxTree>,
        rel_path: &str,
        abs_path: &str,
        ctx: &BuildContext,
    ) -> Result<TagAnnotations> {
        let tag_files = TagToFiles::classify(files, ctx.tags());
        if tag_files.is_empty() {
            return Ok(TagAnnotations::default());
        }

        let mut acc = TagAccumulator::default();
        for (tag, names) in tag_files.iter() {
            // Walked directly: group files may use types declared elsewhere
            let batch = self
                .loader
                .parse_files(rel_path, abs_path, names)
                .map_err(|source| BuildTagError::TagGroup {
                    tag: tag.to_string(),
                    abs_path: abs_path.to_string(),
                    files: names.to_vec(),
                    source: Box::new(source),
                })?;
            tracing::debug!(tag, files = batch.len(), "loaded tag group");

            for tree in batch.values() {
                for key in declaration_keys(tree) {
                    acc.record(key, tag);
                }
            }
        }

        let annotations = acc.render();
        tracing::debug!(
            tags = tag_files.len(),
            identifiers = annotations.len(),
            "mapped identifiers to build tags"
        );
        Ok(annotations)
    }
}

/// @acp:summary "Keys of every top-level function, method, type, const and var"
pub fn declaration_keys(tree: &SyntaxTree) -> Vec<DeclarationKey> {
    let mut keys = Vec::new();
    for decl in &tree.decls {
        match decl {
            Decl::Func { name, receiver } => {
                let receiver = receiver.as_ref().and_then(|expr| {
                    let rendered = expr.render();
                    if rendered.is_none() {
                        tracing::warn!(
                            path = %tree.path,
                            method = %name,
                            receiver = ?expr,
                            "cannot render receiver type, recording method unqualified"
                        );
                    }
                    rendered
                });
                keys.push(DeclarationKey {
                    receiver,
                    name: name.clone(),
                });
            }
            Decl::Gen { specs, .. } => {
                for spec in specs {
                    match spec {
                        Spec::Type { name } => keys.push(DeclarationKey::bare(name.clone())),
                        Spec::Value { names } => {
                            keys.extend(names.iter().cloned().map(DeclarationKey::bare))
                        }
                        Spec::Import { .. } => {}
                    }
                }
            }
        }
    }
    keys
}
