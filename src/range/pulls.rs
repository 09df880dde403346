use anyhow::Result;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::github::api::PullRequestsApi;
use crate::github::types::{Commit, PullRequest, RepoId};

/// How many pull-request lookups may be in flight at once
const MAX_CONCURRENT_LOOKUPS: usize = 8;

const MERGE_PREFIX: &str = "Merge pull request #";

/// Extract the pull request number from a GitHub merge-commit message.
///
/// GitHub's auto-generated merge commits read
/// `Merge pull request #<number> from <branch>`. The match is
/// case-sensitive and anchored at the start of the message; one or more
/// ASCII digits make up the number. Every other message yields `None`.
/// This function is the only place that convention lives.
pub fn merge_pull_request_number(message: &str) -> Option<u64> {
    let rest = message.strip_prefix(MERGE_PREFIX)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

/// Resolve the pull requests merged by the given commits, in the order the
/// commits mention them.
///
/// Commits that are not merge commits, and merge commits whose pull request
/// no longer resolves, are skipped silently. Transport failures propagate.
pub async fn pull_requests_for(
    api: &dyn PullRequestsApi,
    repo: &RepoId,
    commits: &[Commit],
) -> Result<Vec<PullRequest>> {
    let numbers: Vec<u64> = commits
        .iter()
        .filter_map(|commit| merge_pull_request_number(&commit.message))
        .collect();

    // Lookups are independent of one another, so they run with bounded
    // concurrency; `buffered` keeps the results in encounter order.
    let resolved: Vec<Option<PullRequest>> = stream::iter(numbers)
        .map(|number| api.show_pull_request(repo, number))
        .buffered(MAX_CONCURRENT_LOOKUPS)
        .try_collect()
        .await?;

    Ok(resolved.into_iter().flatten().collect())
}
