use std::collections::BTreeMap;
use std::process::Command;

use anyhow::{Context, Result};

use crate::github::types::RepoId;

/// Remote consulted when neither the CLI nor the config names one
pub const DEFAULT_REMOTE: &str = "origin";

/// URLs of the remotes configured for the repository in the current
/// working directory, keyed by remote name.
pub fn remote_urls() -> Result<BTreeMap<String, String>> {
    let output = Command::new("git")
        .arg("remote")
        .output()
        .context("Failed to run git; is it installed?")?;

    if !output.status.success() {
        anyhow::bail!(
            "git remote failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let names = String::from_utf8_lossy(&output.stdout);
    let mut urls = BTreeMap::new();

    for name in names.lines().map(str::trim).filter(|name| !name.is_empty()) {
        let output = Command::new("git")
            .args(["remote", "get-url", name])
            .output()
            .with_context(|| format!("Failed to read URL of remote '{}'", name))?;

        if !output.status.success() {
            continue;
        }

        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !url.is_empty() {
            urls.insert(name.to_string(), url);
        }
    }

    Ok(urls)
}

/// Parse a GitHub remote URL into owner and name.
///
/// Handles the URL shapes git configures for GitHub remotes: scp-like
/// (`git@github.com:owner/name.git`), ssh
/// (`ssh://git@github.com/owner/name.git`), and http(s)
/// (`https://github.com/owner/name`). Other hosts yield `None`.
pub fn parse_remote_url(url: &str) -> Option<RepoId> {
    let path = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;

    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let owner = segments.next()?;
    let name = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    Some(RepoId::new(owner, name))
}

/// Figure out which GitHub repository the working directory tracks
pub fn detect_repository(remote: &str) -> Result<RepoId> {
    let urls = remote_urls()?;
    let url = urls.get(remote).with_context(|| {
        format!(
            "No remote named '{}' is configured; pass --owner and --repo instead",
            remote
        )
    })?;

    parse_remote_url(url).with_context(|| {
        format!(
            "Remote '{}' ({}) does not look like a GitHub repository",
            remote, url
        )
    })
}
