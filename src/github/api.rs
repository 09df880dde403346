use anyhow::{anyhow, Result};
use async_trait::async_trait;
use http::StatusCode;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use crate::github::types::{Commit, PullRequest, RepoId};

/// Commits are fetched 250 per page unless the caller overrides it
pub const DEFAULT_PAGE_SIZE: u8 = 250;

/// Parameters for a single "list commits" page request
#[derive(Debug, Clone, Default)]
pub struct CommitListParams {
    /// SHA the page is anchored on. The remote re-returns the pivot itself
    /// as the newest entry of the page it serves.
    pub pivot_sha: Option<String>,
    /// Overrides the client-wide page size when set
    pub page_size: Option<u8>,
}

impl CommitListParams {
    pub fn pivoted_on(sha: impl Into<String>) -> Self {
        Self {
            pivot_sha: Some(sha.into()),
            page_size: None,
        }
    }
}

/// Read access to the commits of a remote repository.
///
/// `Ok(None)` / an empty page encode "the remote does not have it".
/// `Err` is reserved for transport failures (unreachable remote,
/// unexpected response shape) and always propagates to the caller.
#[async_trait]
pub trait CommitsApi: Send + Sync {
    /// Resolve a reference (SHA, tag, or branch name) to a commit
    async fn show_commit(&self, repo: &RepoId, reference: &str) -> Result<Option<Commit>>;

    /// Fetch one page of commits reachable from the pivot, newest first
    async fn list_commits(&self, repo: &RepoId, params: &CommitListParams) -> Result<Vec<Commit>>;
}

/// Read access to the pull requests of a remote repository
#[async_trait]
pub trait PullRequestsApi: Send + Sync {
    async fn show_pull_request(&self, repo: &RepoId, number: u64) -> Result<Option<PullRequest>>;
}

/// Response shapes the GitHub REST API returns for the endpoints we use.
/// Decoding happens here, at the collaborator boundary; the resolvers only
/// ever see the typed values.
#[derive(Debug, Deserialize)]
struct CommitPayload {
    sha: String,
    commit: CommitDetailPayload,
}

#[derive(Debug, Deserialize)]
struct CommitDetailPayload {
    message: String,
}

impl From<CommitPayload> for Commit {
    fn from(payload: CommitPayload) -> Self {
        Self {
            sha: payload.sha,
            message: payload.commit.message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    title: String,
    user: Option<UserPayload>,
}

impl From<PullRequestPayload> for PullRequest {
    fn from(payload: PullRequestPayload) -> Self {
        Self {
            number: payload.number,
            title: payload.title,
            author: payload.user.map(|user| user.login).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ListCommitsQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    per_page: u8,
}

/// GitHub REST implementation of the two capability traits
pub struct GithubApi {
    client: Octocrab,
    page_size: u8,
}

impl GithubApi {
    pub fn new(client: Octocrab, page_size: Option<u8>) -> Self {
        Self {
            client,
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    // Retry strategy: exponential backoff with 3 attempts. Rate-limit
    // backoff would hook in here (watching Retry-After) if we ever need it.
    fn retry_strategy() -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3)
    }
}

fn is_not_found(error: &octocrab::Error) -> bool {
    matches!(error, octocrab::Error::GitHub { source, .. }
        if source.status_code == StatusCode::NOT_FOUND)
}

/// Only retry failures that have a chance of going away on their own:
/// connection-level errors, server errors, and secondary rate limits.
fn is_transient(error: &octocrab::Error) -> bool {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            source.status_code.is_server_error()
                || source.status_code == StatusCode::TOO_MANY_REQUESTS
        }
        _ => true,
    }
}

fn describe_api_error(error: octocrab::Error) -> anyhow::Error {
    match &error {
        octocrab::Error::GitHub { source, .. } => match source.status_code {
            StatusCode::UNAUTHORIZED => {
                anyhow!("Authentication failed. Your GitHub token may be invalid or expired.")
            }
            StatusCode::FORBIDDEN => anyhow!(
                "GitHub API rate limit exceeded or access denied. Wait a few minutes and \
                check token permissions (needs 'repo' scope for private repos)."
            ),
            _ => anyhow!("GitHub API error: {}", source.message),
        },
        _ => anyhow!("GitHub API error: {}", error),
    }
}

#[async_trait]
impl CommitsApi for GithubApi {
    async fn show_commit(&self, repo: &RepoId, reference: &str) -> Result<Option<Commit>> {
        let route = format!("/repos/{}/{}/commits/{}", repo.owner, repo.name, reference);

        let result = RetryIf::spawn(
            Self::retry_strategy(),
            || async {
                self.client
                    .get::<CommitPayload, _, _>(&route, None::<&()>)
                    .await
            },
            is_transient,
        )
        .await;

        match result {
            Ok(payload) => Ok(Some(payload.into())),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(describe_api_error(error)),
        }
    }

    async fn list_commits(&self, repo: &RepoId, params: &CommitListParams) -> Result<Vec<Commit>> {
        let route = format!("/repos/{}/{}/commits", repo.owner, repo.name);
        let query = ListCommitsQuery {
            sha: params.pivot_sha.as_deref(),
            per_page: params.page_size.unwrap_or(self.page_size),
        };

        let result = RetryIf::spawn(
            Self::retry_strategy(),
            || async {
                self.client
                    .get::<Vec<CommitPayload>, _, _>(&route, Some(&query))
                    .await
            },
            is_transient,
        )
        .await;

        match result {
            Ok(payloads) => Ok(payloads.into_iter().map(Commit::from).collect()),
            Err(error) if is_not_found(&error) => Ok(Vec::new()),
            Err(error) => Err(describe_api_error(error)),
        }
    }
}

#[async_trait]
impl PullRequestsApi for GithubApi {
    async fn show_pull_request(&self, repo: &RepoId, number: u64) -> Result<Option<PullRequest>> {
        let route = format!("/repos/{}/{}/pulls/{}", repo.owner, repo.name, number);

        let result = RetryIf::spawn(
            Self::retry_strategy(),
            || async {
                self.client
                    .get::<PullRequestPayload, _, _>(&route, None::<&()>)
                    .await
            },
            is_transient,
        )
        .await;

        match result {
            Ok(payload) => Ok(Some(payload.into())),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(describe_api_error(error)),
        }
    }
}
