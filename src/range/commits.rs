use anyhow::Result;

use crate::github::api::{CommitListParams, CommitsApi};
use crate::github::types::{Commit, RepoId};

/// Reference the range ends at when the caller does not name one; the
/// remote resolves it to the tip of the default branch.
pub const DEFAULT_END_REF: &str = "HEAD";

/// Resolve both endpoint references to concrete commits, concurrently.
///
/// `Ok(None)` means at least one reference is unknown to the remote: there
/// is no range to compute, which is an expected outcome, not an error.
pub async fn resolve_endpoints(
    api: &dyn CommitsApi,
    repo: &RepoId,
    start_ref: &str,
    end_ref: &str,
) -> Result<Option<(Commit, Commit)>> {
    let (start, end) = tokio::try_join!(
        api.show_commit(repo, start_ref),
        api.show_commit(repo, end_ref),
    )?;

    Ok(start.zip(end))
}

/// Commits strictly after `start_ref` up to and including `end_ref`,
/// oldest first.
///
/// Identical references short-circuit to an empty range without touching
/// the remote, and so does an endpoint the remote does not know. Transport
/// failures propagate; they are never folded into an empty result.
pub async fn commits_between(
    api: &dyn CommitsApi,
    repo: &RepoId,
    start_ref: &str,
    end_ref: Option<&str>,
) -> Result<Vec<Commit>> {
    let end_ref = end_ref.unwrap_or(DEFAULT_END_REF);

    if start_ref == end_ref {
        return Ok(Vec::new());
    }

    match resolve_endpoints(api, repo, start_ref, end_ref).await? {
        Some((start, end)) => walk_history(api, repo, &start, &end).await,
        None => Ok(Vec::new()),
    }
}

/// Backward page walk from `end` towards `start`.
///
/// There is no "commits between A and B" endpoint; the remote only serves
/// pages of commits reachable from a pivot SHA, newest first, and it
/// re-returns the pivot itself as part of the page anchored on it. So the
/// walk threads the oldest consumed SHA through as the next pivot, drops
/// entries matching the carried pivot by identity, and stops at the start
/// commit (which stays excluded), on an empty page, or on a page that
/// yields nothing new. The last two cover shallow histories and a start
/// that is not an ancestor of the end; both leave a partial range rather
/// than failing.
pub(crate) async fn walk_history(
    api: &dyn CommitsApi,
    repo: &RepoId,
    start: &Commit,
    end: &Commit,
) -> Result<Vec<Commit>> {
    let mut collected: Vec<Commit> = Vec::new();
    let mut pivot = end.sha.clone();
    let mut carried: Option<String> = None;

    'pages: loop {
        let page = api
            .list_commits(repo, &CommitListParams::pivoted_on(pivot.clone()))
            .await?;
        if page.is_empty() {
            break;
        }

        let before = collected.len();
        for commit in page {
            if carried.as_deref() == Some(commit.sha.as_str()) {
                continue;
            }
            if commit.sha == start.sha {
                break 'pages;
            }
            collected.push(commit);
        }

        match collected.last() {
            Some(oldest) if collected.len() > before => {
                carried = Some(oldest.sha.clone());
                pivot = oldest.sha.clone();
            }
            // The page contained nothing beyond the repeated pivot.
            _ => break,
        }
    }

    // Pages were consumed newest first; the range reads oldest first.
    collected.reverse();
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn commit(sha: &str, message: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: message.to_string(),
        }
    }

    fn repo() -> RepoId {
        RepoId::new("octocat", "hello-world")
    }

    /// In-memory remote: references resolve through `refs`, and each pivot
    /// SHA maps to the page (newest first) the remote would serve for it.
    #[derive(Default)]
    struct FakeCommitsApi {
        refs: HashMap<String, Commit>,
        pages: HashMap<String, Vec<Commit>>,
        show_calls: Mutex<Vec<String>>,
        list_calls: Mutex<Vec<String>>,
        fail_listing: bool,
    }

    #[async_trait]
    impl CommitsApi for FakeCommitsApi {
        async fn show_commit(&self, _repo: &RepoId, reference: &str) -> Result<Option<Commit>> {
            self.show_calls.lock().unwrap().push(reference.to_string());
            Ok(self.refs.get(reference).cloned())
        }

        async fn list_commits(
            &self,
            _repo: &RepoId,
            params: &CommitListParams,
        ) -> Result<Vec<Commit>> {
            let pivot = params.pivot_sha.clone().unwrap_or_default();
            self.list_calls.lock().unwrap().push(pivot.clone());
            if self.fail_listing {
                return Err(anyhow!("connection reset by peer"));
            }
            Ok(self.pages.get(&pivot).cloned().unwrap_or_default())
        }
    }

    /// History a <- b <- c <- d, oldest to newest
    fn linear_history() -> (Commit, Commit, Commit, Commit) {
        (
            commit("a", "initial import"),
            commit("b", "add parser"),
            commit("c", "Merge pull request #3 from octocat/parser-fixes"),
            commit("d", "fix typo in readme"),
        )
    }

    fn shas(commits: &[Commit]) -> Vec<&str> {
        commits.iter().map(|c| c.sha.as_str()).collect()
    }

    #[tokio::test]
    async fn test_identical_references_make_no_remote_calls() {
        let api = FakeCommitsApi::default();

        let commits = commits_between(&api, &repo(), "v1.0.0", Some("v1.0.0"))
            .await
            .unwrap();

        assert!(commits.is_empty());
        assert!(api.show_calls.lock().unwrap().is_empty());
        assert!(api.list_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_start_reference_yields_empty_range() {
        let (_, _, _, d) = linear_history();
        let api = FakeCommitsApi {
            refs: HashMap::from([("main".to_string(), d)]),
            ..Default::default()
        };

        let commits = commits_between(&api, &repo(), "v0.0.0", Some("main"))
            .await
            .unwrap();

        assert!(commits.is_empty());
        assert!(api.list_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_end_reference_yields_empty_range() {
        let (a, _, _, _) = linear_history();
        let api = FakeCommitsApi {
            refs: HashMap::from([("v1.0.0".to_string(), a)]),
            ..Default::default()
        };

        let commits = commits_between(&api, &repo(), "v1.0.0", Some("gone"))
            .await
            .unwrap();

        assert!(commits.is_empty());
        assert!(api.list_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_page_excludes_start_and_includes_end() {
        let (a, b, c, d) = linear_history();
        let api = FakeCommitsApi {
            refs: HashMap::from([
                ("v1.0.0".to_string(), a.clone()),
                ("main".to_string(), d.clone()),
            ]),
            pages: HashMap::from([(
                "d".to_string(),
                vec![d.clone(), c.clone(), b.clone(), a.clone()],
            )]),
            ..Default::default()
        };

        let commits = commits_between(&api, &repo(), "v1.0.0", Some("main"))
            .await
            .unwrap();

        assert_eq!(shas(&commits), vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_pivot_overlap_is_deduplicated_across_pages() {
        let (a, b, c, d) = linear_history();
        let api = FakeCommitsApi {
            refs: HashMap::from([
                ("v1.0.0".to_string(), a.clone()),
                ("main".to_string(), d.clone()),
            ]),
            pages: HashMap::from([
                ("d".to_string(), vec![d.clone(), c.clone()]),
                ("c".to_string(), vec![c.clone(), b.clone(), a.clone()]),
            ]),
            ..Default::default()
        };

        let commits = commits_between(&api, &repo(), "v1.0.0", Some("main"))
            .await
            .unwrap();

        assert_eq!(shas(&commits), vec!["b", "c", "d"]);
        assert_eq!(*api.list_calls.lock().unwrap(), vec!["d", "c"]);
    }

    #[tokio::test]
    async fn test_empty_page_terminates_with_partial_range() {
        let (a, _, c, d) = linear_history();
        // The walk never reaches "a": the page after "c" is empty.
        let api = FakeCommitsApi {
            refs: HashMap::from([
                ("v1.0.0".to_string(), a),
                ("main".to_string(), d.clone()),
            ]),
            pages: HashMap::from([("d".to_string(), vec![d.clone(), c.clone()])]),
            ..Default::default()
        };

        let commits = commits_between(&api, &repo(), "v1.0.0", Some("main"))
            .await
            .unwrap();

        assert_eq!(shas(&commits), vec!["c", "d"]);
    }

    #[tokio::test]
    async fn test_pivot_only_page_terminates() {
        let (a, _, c, d) = linear_history();
        // "c" is the oldest commit the remote serves; its page repeats only
        // the pivot, which must not loop forever.
        let api = FakeCommitsApi {
            refs: HashMap::from([
                ("v1.0.0".to_string(), a),
                ("main".to_string(), d.clone()),
            ]),
            pages: HashMap::from([
                ("d".to_string(), vec![d.clone(), c.clone()]),
                ("c".to_string(), vec![c.clone()]),
            ]),
            ..Default::default()
        };

        let commits = commits_between(&api, &repo(), "v1.0.0", Some("main"))
            .await
            .unwrap();

        assert_eq!(shas(&commits), vec!["c", "d"]);
        assert_eq!(api.list_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (a, _, _, d) = linear_history();
        let api = FakeCommitsApi {
            refs: HashMap::from([
                ("v1.0.0".to_string(), a),
                ("main".to_string(), d),
            ]),
            fail_listing: true,
            ..Default::default()
        };

        let result = commits_between(&api, &repo(), "v1.0.0", Some("main")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_end_reference_defaults_to_head() {
        let (a, b, c, d) = linear_history();
        let api = FakeCommitsApi {
            refs: HashMap::from([
                ("v1.0.0".to_string(), a.clone()),
                ("HEAD".to_string(), d.clone()),
            ]),
            pages: HashMap::from([(
                "d".to_string(),
                vec![d.clone(), c.clone(), b.clone(), a.clone()],
            )]),
            ..Default::default()
        };

        let commits = commits_between(&api, &repo(), "v1.0.0", None)
            .await
            .unwrap();

        assert_eq!(shas(&commits), vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_repeated_walks_are_deterministic() {
        let (a, b, c, d) = linear_history();
        let api = FakeCommitsApi {
            refs: HashMap::from([
                ("v1.0.0".to_string(), a.clone()),
                ("main".to_string(), d.clone()),
            ]),
            pages: HashMap::from([
                ("d".to_string(), vec![d.clone(), c.clone()]),
                ("c".to_string(), vec![c.clone(), b.clone(), a.clone()]),
            ]),
            ..Default::default()
        };

        let first = commits_between(&api, &repo(), "v1.0.0", Some("main"))
            .await
            .unwrap();
        let second = commits_between(&api, &repo(), "v1.0.0", Some("main"))
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
