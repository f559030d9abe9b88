//! Template caching, parsing, and copying
//!
//! This module provides:
//! - The on-disk template cache with timestamp-based freshness
//! - Zip extraction of downloaded repository archives
//! - The `ctp.json` manifest types
//! - Copying a cached template into a new project

pub mod archive;
pub mod cache;
pub mod copier;
pub mod manifest;

pub use cache::{CacheStatus, CachedTemplate, TemplateCache, TIMESTAMP_FILE};
pub use copier::copy_template;
pub use manifest::{CommandList, CtpManifest, Hooks, Input, QuestionSpec, MANIFEST_FILE};
