//! @acp:module "Build Directive Extractor"
//! @acp:summary "Find the active build tags a file's +build comments mention"
//! @acp:domain analysis
//! @acp:layer logic
//!
//! A directive is any comment containing `+build`. Its text is split into
//! fields and every field that is an active tag counts. Directives are
//! treated as flat token sets: `!a` is a plain field and separate lines
//! are not ANDed together.
//!
//! Text holding a space or `'` is split into quoted fields, so `a,b` stays
//! one field there. Any other text is split on commas only, the way a
//! `-tags` flag value is read.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::SyntaxTree;

/// Substring that marks a comment as a build directive
pub const BUILD_DIRECTIVE: &str = "+build";

/// One field: double-quoted, single-quoted or a bare run up to ASCII space, tab, CR or LF
static FIELD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"|'([^']*)'|([^ \t\r\n]+)"#).unwrap());

/// @acp:summary "Split directive text into candidate tags"
/// Returns `None` when quoted splitting hits an unterminated quote.
pub fn directive_fields(text: &str) -> Option<Vec<String>> {
    if text.contains(' ') || text.contains('\'') {
        return split_quoted_fields(text);
    }
    Some(
        text.split(',')
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// @acp:summary "Split a directive line into fields"
/// Quotes group a field and are stripped. Returns `None` for an
/// unterminated quote, which makes the whole line contribute nothing.
pub fn split_quoted_fields(text: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    for caps in FIELD_PATTERN.captures_iter(text) {
        if let Some(quoted) = caps.get(1).or_else(|| caps.get(2)) {
            fields.push(quoted.as_str().to_string());
        } else if let Some(bare) = caps.get(3) {
            let bare = bare.as_str();
            if bare.starts_with('"') || bare.starts_with('\'') {
                return None;
            }
            fields.push(bare.to_string());
        }
    }
    Some(fields)
}

/// @acp:summary "Collect the allowed tags mentioned by a file's directives"
/// Tags are deduplicated in order of first appearance. Returns `None` when
/// no allowed tag is mentioned.
pub fn find_build_tags(tree: &SyntaxTree, allowed_tags: &[String]) -> Option<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();

    for comment in tree.comments() {
        if !comment.text.contains(BUILD_DIRECTIVE) {
            continue;
        }
        let Some(fields) = directive_fields(&comment.text) else {
            tracing::debug!(path = %tree.path, line = comment.line, "unterminated quote in build directive");
            continue;
        };
        for field in fields {
            if allowed_tags.contains(&field) && !tags.contains(&field) {
                tags.push(field);
            }
        }
    }

    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}
