//! @acp:module "Build Tags"
//! @acp:summary "Build directive extraction and identifier-to-tag mapping"
//! @acp:domain analysis
//! @acp:layer logic
//! @acp:stability stable

pub mod directive;
pub mod mapper;

pub use directive::{directive_fields, find_build_tags, split_quoted_fields, BUILD_DIRECTIVE};
pub use mapper::{declaration_keys, IdentifierTagMapper, TagAnnotations, TagToFiles, TAG_SEPARATOR};
