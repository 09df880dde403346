pub mod api;
pub mod cache;
pub mod client;
pub mod types;

pub use api::{CommitListParams, CommitsApi, GithubApi, PullRequestsApi, DEFAULT_PAGE_SIZE};
pub use cache::{clear_cache, get_cache_path, RangeCache};
pub use client::create_client;
pub use types::{Commit, PullRequest, Range, RepoId};
