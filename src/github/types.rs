use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a GitHub repository by owner and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A single commit as returned by the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
}

// Two commits are the same commit iff they have the same SHA; the message
// never participates in identity.
impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.sha == other.sha
    }
}

impl Eq for Commit {}

/// A pull request as returned by the GitHub API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Login of the user that opened the pull request
    pub author: String,
}

/// The resolved result: commits between two references (oldest first,
/// start excluded, end included) and the pull requests merged by them,
/// in the order they were discovered while scanning the commits.
///
/// Constructed once via [`Range::of`]; read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Range {
    commits: Vec<Commit>,
    pull_requests: Vec<PullRequest>,
}

impl Range {
    pub fn of(commits: Vec<Commit>, pull_requests: Vec<PullRequest>) -> Self {
        Self {
            commits,
            pull_requests,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn pull_requests(&self) -> &[PullRequest] {
        &self.pull_requests
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.pull_requests.is_empty()
    }
}
