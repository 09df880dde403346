pub mod commits;
pub mod pulls;

pub use commits::{commits_between, resolve_endpoints, DEFAULT_END_REF};
pub use pulls::{merge_pull_request_number, pull_requests_for};

use anyhow::Result;
use std::time::Instant;

use crate::github::api::{CommitsApi, PullRequestsApi};
use crate::github::cache::RangeCache;
use crate::github::types::{Range, RepoId};

/// Resolve the full changelog range between two references: the commit
/// walk first, then the pull-request association over its result.
///
/// The cache is consulted between endpoint resolution and the walk, keyed
/// by the resolved SHA pair rather than the input references. This
/// function is called from main.rs once per invocation.
pub async fn resolve_range(
    commits_api: &dyn CommitsApi,
    pulls_api: &dyn PullRequestsApi,
    repo: &RepoId,
    start_ref: &str,
    end_ref: Option<&str>,
    cache: Option<&RangeCache>,
    verbose: bool,
) -> Result<Range> {
    let started = Instant::now();
    let end_ref = end_ref.unwrap_or(DEFAULT_END_REF);

    if start_ref == end_ref {
        return Ok(Range::empty());
    }

    let (start, end) = match resolve_endpoints(commits_api, repo, start_ref, end_ref).await? {
        Some(endpoints) => endpoints,
        None => {
            if verbose {
                eprintln!(
                    "Reference '{}' or '{}' does not exist on {}",
                    start_ref, end_ref, repo
                );
            }
            return Ok(Range::empty());
        }
    };

    let key = RangeCache::key(repo, &start.sha, &end.sha);
    if let Some(cache) = cache {
        if let Some(range) = cache.load(&key) {
            if verbose {
                eprintln!(
                    "Cache hit: {} commits, {} pull requests in {:?}",
                    range.commits().len(),
                    range.pull_requests().len(),
                    started.elapsed()
                );
            }
            return Ok(range);
        }
    }

    let commits = commits::walk_history(commits_api, repo, &start, &end).await?;
    if verbose {
        eprintln!(
            "Found {} commits between {} and {}",
            commits.len(),
            start_ref,
            end_ref
        );
    }

    let pull_requests = pull_requests_for(pulls_api, repo, &commits).await?;
    if verbose {
        eprintln!(
            "Matched {} merged pull requests in {:?}",
            pull_requests.len(),
            started.elapsed()
        );
    }

    let range = Range::of(commits, pull_requests);
    if let Some(cache) = cache {
        cache.store(&key, &range);
    }

    Ok(range)
}
