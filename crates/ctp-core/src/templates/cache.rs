//! Local cache of downloaded templates
//!
//! Layout, one directory per template:
//!
//! ```text
//! <cache-root>/<owner>-<repo>/             template tree
//! <cache-root>/<owner>-<repo>/.timestamp   remote updated_at (epoch ms) of that tree
//! ```
//!
//! An entry is only ever replaced as a whole. A refresh unpacks into a hidden
//! staging directory next to the entry, writes the timestamp into the staged
//! tree, and only then swaps it in.

use super::archive;
use crate::error::{CtpError, Result};
use crate::repository::{CacheKey, RepositoryFetcher, RepositoryIdentity, RepositoryMetadata};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the sidecar file holding the remote timestamp of an entry
pub const TIMESTAMP_FILE: &str = ".timestamp";

/// How a template entry was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// The cached copy is as new as the remote
    Hit,
    /// The entry was (re)downloaded
    Refreshed,
    /// The remote could not be reached; an older cached copy is used
    Stale { reason: String },
}

/// A template directory ready to be copied
#[derive(Debug, Clone)]
pub struct CachedTemplate {
    pub path: PathBuf,
    pub status: CacheStatus,
}

/// On-disk template cache rooted at one directory
#[derive(Debug, Clone)]
pub struct TemplateCache {
    root: PathBuf,
}

impl TemplateCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the entry for `key`
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    fn staging_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!(".{}.staging", key))
    }

    /// Remote timestamp recorded for `key`, if the entry was ever synced
    pub async fn timestamp(&self, key: &CacheKey) -> Option<i64> {
        let path = self.entry_path(key).join(TIMESTAMP_FILE);
        let content = fs::read_to_string(&path).await.ok()?;

        match content.trim().parse() {
            Ok(timestamp) => Some(timestamp),
            Err(_) => {
                tracing::debug!(path = %path.display(), "ignoring unreadable timestamp");
                None
            }
        }
    }

    /// Whether an entry synced at `local` is older than the remote `updated_at`
    pub fn needs_refresh(local: Option<i64>, remote: i64) -> bool {
        match local {
            Some(local) => remote > local,
            None => true,
        }
    }

    /// Make sure a usable copy of the template is on disk.
    ///
    /// Any failure to reach the remote or to install a new copy falls back to
    /// an existing entry, reported as [`CacheStatus::Stale`]. Without an
    /// existing entry the failure becomes [`CtpError::TemplateUnavailable`].
    pub async fn ensure_fresh(
        &self,
        identity: &RepositoryIdentity,
        fetcher: &dyn RepositoryFetcher,
        force: bool,
    ) -> Result<CachedTemplate> {
        let path = self.entry_path(&identity.cache_key());

        let result = match fetcher.metadata(identity).await {
            Ok(metadata) => self.update(identity, &metadata, fetcher, force).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(status) => Ok(CachedTemplate { path, status }),
            Err(e) if path.is_dir() => {
                let reason = format!("{:#}", anyhow::Error::from(e));
                tracing::warn!(template = %identity, %reason, "using cached template");
                Ok(CachedTemplate {
                    path,
                    status: CacheStatus::Stale { reason },
                })
            }
            Err(e) => Err(CtpError::TemplateUnavailable {
                reference: identity.to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Bring the entry in line with known remote `metadata`.
    ///
    /// Downloads when the entry was never synced, when the remote is newer,
    /// or when `force` is set. Otherwise the entry is left as it is.
    pub async fn update(
        &self,
        identity: &RepositoryIdentity,
        metadata: &RepositoryMetadata,
        fetcher: &dyn RepositoryFetcher,
        force: bool,
    ) -> Result<CacheStatus> {
        let local = self.timestamp(&identity.cache_key()).await;

        if !force && !Self::needs_refresh(local, metadata.updated_at) {
            tracing::debug!(template = %identity, ?local, remote = metadata.updated_at, "cache hit");
            return Ok(CacheStatus::Hit);
        }

        self.refresh(identity, metadata, fetcher).await?;
        Ok(CacheStatus::Refreshed)
    }

    /// Download the template and replace its entry
    pub async fn refresh(
        &self,
        identity: &RepositoryIdentity,
        metadata: &RepositoryMetadata,
        fetcher: &dyn RepositoryFetcher,
    ) -> Result<PathBuf> {
        tracing::info!(template = %identity, reference = %metadata.default_ref, "downloading template");
        let zip_bytes = fetcher.archive(identity, &metadata.default_ref).await?;

        let key = identity.cache_key();
        let entry = self.entry_path(&key);
        let staging = self.staging_path(&key);

        fs::create_dir_all(&self.root).await?;
        remove_dir_if_exists(&staging).await?;

        let installed = install(&zip_bytes, &staging, &entry, metadata.updated_at).await;
        remove_dir_if_exists(&staging).await?;
        installed?;

        Ok(entry)
    }

    /// Keys of all cached templates, sorted
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.file_type().await?.is_dir() {
                continue;
            }
            keys.push(name);
        }
        keys.sort();

        Ok(keys)
    }
}

async fn install(zip_bytes: &[u8], staging: &Path, entry: &Path, updated_at: i64) -> Result<()> {
    archive::unpack(zip_bytes, staging)?;
    let wrapper = archive::wrapper_dir(staging)?;

    fs::write(wrapper.join(TIMESTAMP_FILE), updated_at.to_string()).await?;

    remove_dir_if_exists(entry).await?;
    fs::rename(&wrapper, entry).await?;

    Ok(())
}

async fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::archive::tests::build_zip;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FakeFetcher {
        updated_at: Option<i64>,
        zip: Vec<u8>,
        archive_calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn online(updated_at: i64, files: &[(&str, &str)]) -> Self {
            Self {
                updated_at: Some(updated_at),
                zip: build_zip(files),
                archive_calls: AtomicUsize::new(0),
            }
        }

        fn offline() -> Self {
            Self {
                updated_at: None,
                zip: Vec::new(),
                archive_calls: AtomicUsize::new(0),
            }
        }

        fn downloads(&self) -> usize {
            self.archive_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RepositoryFetcher for FakeFetcher {
        async fn metadata(&self, _identity: &RepositoryIdentity) -> Result<RepositoryMetadata> {
            match self.updated_at {
                Some(updated_at) => Ok(RepositoryMetadata {
                    default_ref: "main".to_string(),
                    updated_at,
                }),
                None => Err(CtpError::HttpStatus {
                    url: "https://api.github.com/repos/owner/repo".to_string(),
                    status: 503,
                }),
            }
        }

        async fn archive(&self, _identity: &RepositoryIdentity, reference: &str) -> Result<Vec<u8>> {
            assert_eq!(reference, "main");
            self.archive_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.zip.clone())
        }
    }

    fn identity() -> RepositoryIdentity {
        RepositoryIdentity::parse("owner/repo").unwrap()
    }

    async fn seed(cache: &TemplateCache, updated_at: i64, files: &[(&str, &str)]) {
        let fetcher = FakeFetcher::online(updated_at, files);
        cache.ensure_fresh(&identity(), &fetcher, false).await.unwrap();
    }

    #[test]
    fn test_needs_refresh() {
        assert!(TemplateCache::needs_refresh(None, 0));
        assert!(TemplateCache::needs_refresh(Some(100), 101));
        assert!(!TemplateCache::needs_refresh(Some(100), 100));
        assert!(!TemplateCache::needs_refresh(Some(100), 99));
    }

    #[tokio::test]
    async fn test_first_sync_creates_entry() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        let fetcher = FakeFetcher::online(
            1_000,
            &[("owner-repo-abc/ctp.json", "{}"), ("owner-repo-abc/src/a.ts", "a")],
        );

        let cached = cache.ensure_fresh(&identity(), &fetcher, false).await.unwrap();

        assert_eq!(cached.status, CacheStatus::Refreshed);
        assert_eq!(cached.path, dir.path().join("owner-repo"));
        assert!(cached.path.join("ctp.json").is_file());
        assert!(cached.path.join("src/a.ts").is_file());
        assert!(!cached.path.join("owner-repo-abc").exists());
        assert_eq!(cache.timestamp(&identity().cache_key()).await, Some(1_000));
        assert!(!dir.path().join(".owner-repo.staging").exists());
    }

    #[tokio::test]
    async fn test_hit_when_remote_not_newer() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        seed(&cache, 1_000, &[("w/ctp.json", "{}")]).await;

        for remote in [999, 1_000] {
            let fetcher = FakeFetcher::online(remote, &[("w/other.txt", "x")]);
            let cached = cache.ensure_fresh(&identity(), &fetcher, false).await.unwrap();

            assert_eq!(cached.status, CacheStatus::Hit);
            assert_eq!(fetcher.downloads(), 0);
            assert!(cached.path.join("ctp.json").exists());
        }
    }

    #[tokio::test]
    async fn test_newer_remote_replaces_entry() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        seed(&cache, 1_000, &[("w/old.txt", "old")]).await;

        let fetcher = FakeFetcher::online(2_000, &[("w2/new.txt", "new")]);
        let cached = cache.ensure_fresh(&identity(), &fetcher, false).await.unwrap();

        assert_eq!(cached.status, CacheStatus::Refreshed);
        assert_eq!(fetcher.downloads(), 1);
        assert!(!cached.path.join("old.txt").exists());
        assert!(cached.path.join("new.txt").exists());
        assert_eq!(cache.timestamp(&identity().cache_key()).await, Some(2_000));
    }

    #[tokio::test]
    async fn test_force_refresh() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        seed(&cache, 1_000, &[("w/a.txt", "a")]).await;

        let fetcher = FakeFetcher::online(1_000, &[("w/a.txt", "b")]);
        let cached = cache.ensure_fresh(&identity(), &fetcher, true).await.unwrap();

        assert_eq!(cached.status, CacheStatus::Refreshed);
        assert_eq!(std::fs::read_to_string(cached.path.join("a.txt")).unwrap(), "b");
    }

    #[tokio::test]
    async fn test_unreadable_timestamp_forces_refresh() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        seed(&cache, 1_000, &[("w/a.txt", "a")]).await;
        std::fs::write(dir.path().join("owner-repo").join(TIMESTAMP_FILE), "garbage").unwrap();

        let fetcher = FakeFetcher::online(5, &[("w/a.txt", "a")]);
        let cached = cache.ensure_fresh(&identity(), &fetcher, false).await.unwrap();

        assert_eq!(cached.status, CacheStatus::Refreshed);
    }

    #[tokio::test]
    async fn test_offline_falls_back_to_cache() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        seed(&cache, 1_000, &[("w/a.txt", "a")]).await;

        let cached = cache
            .ensure_fresh(&identity(), &FakeFetcher::offline(), false)
            .await
            .unwrap();

        assert!(matches!(cached.status, CacheStatus::Stale { ref reason } if reason.contains("503")));
        assert!(cached.path.join("a.txt").exists());
    }

    #[tokio::test]
    async fn test_offline_without_cache_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());

        let result = cache
            .ensure_fresh(&identity(), &FakeFetcher::offline(), false)
            .await;

        assert!(matches!(result, Err(CtpError::TemplateUnavailable { .. })));
        assert!(!dir.path().join("owner-repo").exists());
    }

    #[tokio::test]
    async fn test_bad_archive_keeps_old_entry() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        seed(&cache, 1_000, &[("w/a.txt", "a")]).await;

        let fetcher = FakeFetcher::online(2_000, &[("one/a.txt", "x"), ("two/b.txt", "y")]);
        let cached = cache.ensure_fresh(&identity(), &fetcher, false).await.unwrap();

        assert!(matches!(cached.status, CacheStatus::Stale { .. }));
        assert_eq!(std::fs::read_to_string(cached.path.join("a.txt")).unwrap(), "a");
        assert_eq!(cache.timestamp(&identity().cache_key()).await, Some(1_000));
        assert!(!dir.path().join(".owner-repo.staging").exists());
    }

    #[tokio::test]
    async fn test_bad_archive_without_cache_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        let fetcher = FakeFetcher::online(2_000, &[("loose.txt", "x")]);

        let result = cache.ensure_fresh(&identity(), &fetcher, false).await;

        assert!(matches!(
            result,
            Err(CtpError::TemplateUnavailable { ref source, .. })
                if matches!(**source, CtpError::ArchiveLayout { .. })
        ));
        assert!(!dir.path().join("owner-repo").exists());
    }

    #[tokio::test]
    async fn test_list_skips_staging_and_files() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path());
        seed(&cache, 1_000, &[("w/a.txt", "a")]).await;
        std::fs::create_dir(dir.path().join(".other-repo.staging")).unwrap();
        std::fs::create_dir(dir.path().join("alpha-beta")).unwrap();
        std::fs::write(dir.path().join("stray.txt"), "").unwrap();

        assert_eq!(cache.list().await.unwrap(), vec!["alpha-beta", "owner-repo"]);
    }

    #[tokio::test]
    async fn test_list_missing_root() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::new(dir.path().join("nope"));
        assert!(cache.list().await.unwrap().is_empty());
    }
}
