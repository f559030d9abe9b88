//! Template repository identity and remote access
//!
//! This module provides:
//! - Parsing of `owner/repo` references into a [`RepositoryIdentity`]
//! - The cache key derived from an identity
//! - The [`RepositoryFetcher`] seam used to read metadata and archives

pub mod github;

use crate::error::{CtpError, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

pub use github::GithubFetcher;

/// Owner and name of a template repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    owner: String,
    repo: String,
}

impl RepositoryIdentity {
    /// Parse an `owner/repo` reference.
    ///
    /// The reference must contain exactly one `/` with a non-empty segment on
    /// each side.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = || CtpError::InvalidReference(reference.to_string());

        let (owner, repo) = reference.rsplit_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || owner.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Directory name of this template inside the cache root.
    ///
    /// Owners and repos may both contain `-`, so `a-b/c` and `a/b-c` share
    /// a key and therefore a cache slot.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey(format!("{}-{}", self.owner, self.repo))
    }
}

impl FromStr for RepositoryIdentity {
    type Err = CtpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Stable name of a cache entry, `<owner>-<repo>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote state of a template repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    /// Branch (or other ref) the archive is taken from
    pub default_ref: String,
    /// Last time the repository changed, in epoch milliseconds
    pub updated_at: i64,
}

/// Source of repository metadata and archives
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Fetch the repository's default ref and last-updated time
    async fn metadata(&self, identity: &RepositoryIdentity) -> Result<RepositoryMetadata>;

    /// Fetch a zip archive of the repository at `reference`
    async fn archive(&self, identity: &RepositoryIdentity, reference: &str) -> Result<Vec<u8>>;
}
