use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::github::types::{Range, RepoId};

/// Get the platform-appropriate cache directory for gh-changelog
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("gh-changelog/range-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/gh-changelog/range-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Remove every cached range
pub fn clear_cache() -> Result<()> {
    let cache_path = get_cache_path();
    match std::fs::remove_dir_all(&cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Disk-persistent cache of resolved ranges, backed by cacache.
///
/// Entries are keyed by the resolved start/end SHA pair. Branch and tag
/// references are resolved to SHAs before the cache is consulted; the
/// commits between two fixed SHAs do not change.
pub struct RangeCache {
    cache_path: PathBuf,
}

impl RangeCache {
    pub fn new(cache_path: PathBuf) -> Self {
        Self { cache_path }
    }

    /// Cache key for a resolved range
    pub fn key(repo: &RepoId, start_sha: &str, end_sha: &str) -> String {
        format!("range/{}/{}/{}..{}", repo.owner, repo.name, start_sha, end_sha)
    }

    /// Look up a previously resolved range. Decode failures and missing
    /// entries are both misses.
    pub fn load(&self, key: &str) -> Option<Range> {
        let bytes = cacache::read_sync(&self.cache_path, key).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Persist a resolved range. Write failures are fire-and-forget.
    pub fn store(&self, key: &str, range: &Range) {
        if let Ok(bytes) = serde_json::to_vec(range) {
            let _ = cacache::write_sync(&self.cache_path, key, &bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{Commit, PullRequest};
    use std::env;

    fn temp_cache(name: &str) -> RangeCache {
        let path = env::temp_dir().join(format!("gh_changelog_cache_test_{}", name));
        let _ = std::fs::remove_dir_all(&path);
        RangeCache::new(path)
    }

    fn sample_range() -> Range {
        Range::of(
            vec![Commit {
                sha: "abc123".to_string(),
                message: "Merge pull request #1 from octocat/feature".to_string(),
            }],
            vec![PullRequest {
                number: 1,
                title: "Feature".to_string(),
                author: "octocat".to_string(),
            }],
        )
    }

    #[test]
    fn test_key_includes_repo_and_sha_pair() {
        let repo = RepoId::new("octocat", "hello-world");
        assert_eq!(
            RangeCache::key(&repo, "aaa", "bbb"),
            "range/octocat/hello-world/aaa..bbb"
        );
    }

    #[test]
    fn test_load_missing_entry_is_none() {
        let cache = temp_cache("missing");
        assert!(cache.load("range/none/none/a..b").is_none());
    }

    #[test]
    fn test_store_and_load_roundtrip() {
        let cache = temp_cache("roundtrip");
        let repo = RepoId::new("octocat", "hello-world");
        let key = RangeCache::key(&repo, "aaa", "bbb");
        let range = sample_range();

        cache.store(&key, &range);
        let loaded = cache.load(&key).expect("entry should exist");

        assert_eq!(loaded.commits(), range.commits());
        assert_eq!(loaded.pull_requests(), range.pull_requests());
    }
}
