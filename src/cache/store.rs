// Snapshot cache for GitHub data.
// Keyed in-memory tables with per-entry TTL, persisted as one versioned
// JSON snapshot between invocations.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::github::{RepoMetrics, Repository};

/// Snapshots with a different version are discarded wholesale on load.
const SNAPSHOT_VERSION: u32 = 1;

/// How long a cached entry stays usable: 1 hour.
pub const TIME_TO_LIVE_SECS: i64 = 60 * 60;

/// A cached value tagged with its refresh time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<T> {
    value: T,
    last_refreshed_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            last_refreshed_at: Utc::now(),
        }
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        (now - self.last_refreshed_at).num_seconds() > TIME_TO_LIVE_SECS
    }
}

/// In-memory cache of org repo listings and per-repo metric records.
///
/// Repo metrics are keyed by full name (owner/repo) so identically-named
/// repos in different organizations cannot collide. Not safe for concurrent
/// writers: two invocations sharing a snapshot path race on save and the
/// last writer wins.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotCache {
    version: u32,
    repos_by_org: HashMap<String, CacheEntry<Vec<Repository>>>,
    metrics_by_repo_full_name: HashMap<String, CacheEntry<RepoMetrics>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            repos_by_org: HashMap::new(),
            metrics_by_repo_full_name: HashMap::new(),
        }
    }
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached repository listing for an organization, unless stale.
    /// A stale entry is evicted by the read that finds it.
    pub fn repos_for_org(&mut self, org: &str) -> Option<Vec<Repository>> {
        let now = Utc::now();
        match self.repos_by_org.get(org) {
            Some(entry) if entry.is_stale(now) => {
                debug!(org, "evicting stale org repo listing");
                self.repos_by_org.remove(org);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Store an organization's repository listing, resetting its age.
    pub fn put_repos_for_org(&mut self, org: &str, repos: Vec<Repository>) {
        self.repos_by_org
            .insert(org.to_string(), CacheEntry::new(repos));
    }

    /// Cached metrics record for a repository, unless stale.
    pub fn metrics_for_repo(&mut self, repo_full_name: &str) -> Option<RepoMetrics> {
        let now = Utc::now();
        match self.metrics_by_repo_full_name.get(repo_full_name) {
            Some(entry) if entry.is_stale(now) => {
                debug!(repo = repo_full_name, "evicting stale metrics record");
                self.metrics_by_repo_full_name.remove(repo_full_name);
                None
            }
            Some(entry) => Some(entry.value),
            None => None,
        }
    }

    /// Store a repository's metrics record wholesale.
    pub fn put_repo_metrics(&mut self, repo_full_name: &str, metrics: RepoMetrics) {
        self.metrics_by_repo_full_name
            .insert(repo_full_name.to_string(), CacheEntry::new(metrics));
    }

    pub fn is_empty(&self) -> bool {
        self.repos_by_org.is_empty() && self.metrics_by_repo_full_name.is_empty()
    }

    /// Load the cache from a snapshot file.
    ///
    /// A missing file, an unreadable or undeserializable snapshot, and a
    /// version mismatch all yield an empty cache rather than an error.
    /// `refresh` discards any existing snapshot unconditionally.
    pub fn load(path: &Path, refresh: bool) -> Self {
        if refresh {
            debug!("cache refresh requested, starting empty");
            return Self::new();
        }
        if !path.exists() {
            return Self::new();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(error = %e, "unreadable snapshot, starting empty");
                return Self::new();
            }
        };

        match serde_json::from_str::<SnapshotCache>(&contents) {
            Ok(cache) if cache.version == SNAPSHOT_VERSION => cache,
            Ok(cache) => {
                debug!(
                    found = cache.version,
                    expected = SNAPSHOT_VERSION,
                    "snapshot version mismatch, starting empty"
                );
                Self::new()
            }
            Err(e) => {
                debug!(error = %e, "corrupt snapshot, starting empty");
                Self::new()
            }
        }
    }

    /// Persist the whole cache to the snapshot file.
    ///
    /// Creates the parent directory if needed and writes atomically via a
    /// temp file rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::test_repository;
    use tempfile::TempDir;

    fn metrics(stars: u64, forks: u64, pulls: u64) -> RepoMetrics {
        RepoMetrics {
            stars_count: stars,
            forks_count: forks,
            pull_requests_count: pulls,
        }
    }

    fn backdate_org(cache: &mut SnapshotCache, org: &str, secs: i64) {
        let entry = cache.repos_by_org.get_mut(org).unwrap();
        entry.last_refreshed_at = Utc::now() - chrono::Duration::seconds(secs);
    }

    fn backdate_repo(cache: &mut SnapshotCache, repo: &str, secs: i64) {
        let entry = cache.metrics_by_repo_full_name.get_mut(repo).unwrap();
        entry.last_refreshed_at = Utc::now() - chrono::Duration::seconds(secs);
    }

    #[test]
    fn test_repos_for_org_absent() {
        let mut cache = SnapshotCache::new();
        assert_eq!(cache.repos_for_org("random-org"), None);
    }

    #[test]
    fn test_repos_for_org_round_trip() {
        let mut cache = SnapshotCache::new();
        let repos = vec![
            test_repository("cool-org", "RepoA"),
            test_repository("cool-org", "AnotherRepo1"),
        ];

        cache.put_repos_for_org("cool-org", repos.clone());
        assert_eq!(cache.repos_for_org("cool-org"), Some(repos));
    }

    #[test]
    fn test_repos_for_org_stale_entry_evicted() {
        let mut cache = SnapshotCache::new();
        cache.put_repos_for_org("cool-cats", vec![test_repository("cool-cats", "123")]);

        backdate_org(&mut cache, "cool-cats", TIME_TO_LIVE_SECS + 100);
        assert_eq!(cache.repos_for_org("cool-cats"), None);
        // The read that found it stale removed it
        assert!(!cache.repos_by_org.contains_key("cool-cats"));
    }

    #[test]
    fn test_repos_for_org_fresh_within_ttl() {
        let mut cache = SnapshotCache::new();
        let repos = vec![test_repository("hello", "there")];
        cache.put_repos_for_org("hello", repos.clone());

        backdate_org(&mut cache, "hello", 500);
        assert_eq!(cache.repos_for_org("hello"), Some(repos));
    }

    #[test]
    fn test_metrics_round_trip_and_overwrite() {
        let mut cache = SnapshotCache::new();

        cache.put_repo_metrics("org/repo-name", metrics(1, 2, 3));
        assert_eq!(cache.metrics_for_repo("org/repo-name"), Some(metrics(1, 2, 3)));

        // Refresh replaces the whole record
        cache.put_repo_metrics("org/repo-name", metrics(12, 0, 34));
        assert_eq!(
            cache.metrics_for_repo("org/repo-name"),
            Some(metrics(12, 0, 34))
        );
    }

    #[test]
    fn test_metrics_stale_entry_evicted() {
        let mut cache = SnapshotCache::new();
        cache.put_repo_metrics("org/repo-name2", metrics(0, 0, 13));

        backdate_repo(&mut cache, "org/repo-name2", 5000);
        assert_eq!(cache.metrics_for_repo("org/repo-name2"), None);
        assert!(
            !cache
                .metrics_by_repo_full_name
                .contains_key("org/repo-name2")
        );
    }

    #[test]
    fn test_metrics_keyed_by_full_name() {
        let mut cache = SnapshotCache::new();
        cache.put_repo_metrics("org-a/tool", metrics(5, 0, 0));
        cache.put_repo_metrics("org-b/tool", metrics(9, 0, 0));

        assert_eq!(cache.metrics_for_repo("org-a/tool"), Some(metrics(5, 0, 0)));
        assert_eq!(cache.metrics_for_repo("org-b/tool"), Some(metrics(9, 0, 0)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache").join("github_data.json");

        let mut cache = SnapshotCache::new();
        cache.put_repos_for_org("org", vec![test_repository("org", "repo")]);
        cache.put_repo_metrics("org/repo", metrics(7, 20, 3));
        cache.save(&path).unwrap();

        let mut loaded = SnapshotCache::load(&path, false);
        assert_eq!(
            loaded.repos_for_org("org"),
            Some(vec![test_repository("org", "repo")])
        );
        assert_eq!(loaded.metrics_for_repo("org/repo"), Some(metrics(7, 20, 3)));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let cache = SnapshotCache::load(&path, false);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("github_data.json");
        std::fs::write(&path, "not valid json {{{").unwrap();

        let mut cache = SnapshotCache::load(&path, false);
        assert!(cache.is_empty());
        assert_eq!(cache.repos_for_org("org"), None);
        assert_eq!(cache.metrics_for_repo("org/repo"), None);
    }

    #[test]
    fn test_load_version_mismatch_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("github_data.json");

        let mut cache = SnapshotCache::new();
        cache.put_repo_metrics("org/repo", metrics(1, 2, 3));
        cache.version = SNAPSHOT_VERSION + 1;
        cache.save(&path).unwrap();

        let loaded = SnapshotCache::load(&path, false);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_with_refresh_discards_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("github_data.json");

        let mut cache = SnapshotCache::new();
        cache.put_repo_metrics("org/repo", metrics(1, 2, 3));
        cache.save(&path).unwrap();

        let loaded = SnapshotCache::load(&path, true);
        assert!(loaded.is_empty());
    }
}
