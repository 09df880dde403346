use std::io::IsTerminal;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::github::types::{Commit, PullRequest, Range};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// First line of a commit message
fn summary_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Abbreviated SHA, the way git displays one
fn short_sha(sha: &str) -> &str {
    if sha.len() > 7 {
        &sha[..7]
    } else {
        sha
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn format_pull_line(pull: &PullRequest, use_colors: bool) -> String {
    let number = format!("#{}", pull.number);

    // Fixed parts: two-space indent, two-space separators, parens
    let fixed_width = 2 + number.len() + 2 + pull.author.len() + 3;
    let title = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => {
            truncate_title(&pull.title, width - fixed_width)
        }
        _ => pull.title.clone(),
    };

    if use_colors {
        format!(
            "  {}  {} ({})",
            number.cyan(),
            title.bold(),
            pull.author.yellow()
        )
    } else {
        format!("  {}  {} ({})", number, title, pull.author)
    }
}

fn format_commit_line(commit: &Commit, use_colors: bool) -> String {
    let sha = short_sha(&commit.sha);
    let summary = summary_line(&commit.message);

    if use_colors {
        format!("  {}  {}", sha.cyan(), summary)
    } else {
        format!("  {}  {}", sha, summary)
    }
}

/// Format a resolved range for the terminal: pull requests first (they are
/// the changelog entries people read), then the commits backing them.
pub fn format_text(range: &Range, use_colors: bool) -> String {
    if range.is_empty() {
        return "No commits found in range.".to_string();
    }

    let mut lines = Vec::new();

    if !range.pull_requests().is_empty() {
        lines.push(heading("Pull requests", use_colors));
        for pull in range.pull_requests() {
            lines.push(format_pull_line(pull, use_colors));
        }
        lines.push(String::new());
    }

    lines.push(heading("Commits", use_colors));
    for commit in range.commits() {
        lines.push(format_commit_line(commit, use_colors));
    }

    lines.join("\n")
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Format a resolved range as a markdown changelog fragment
pub fn format_markdown(range: &Range) -> String {
    if range.is_empty() {
        return "_No commits found in range._".to_string();
    }

    let mut lines = Vec::new();

    if !range.pull_requests().is_empty() {
        lines.push("## Pull requests".to_string());
        for pull in range.pull_requests() {
            if pull.author.is_empty() {
                lines.push(format!("- {} (#{})", pull.title, pull.number));
            } else {
                lines.push(format!(
                    "- {} (#{}), by @{}",
                    pull.title, pull.number, pull.author
                ));
            }
        }
        lines.push(String::new());
    }

    lines.push("## Commits".to_string());
    for commit in range.commits() {
        lines.push(format!(
            "- `{}` {}",
            short_sha(&commit.sha),
            summary_line(&commit.message)
        ));
    }

    lines.join("\n")
}

/// Format a resolved range as pretty-printed JSON
pub fn format_json(range: &Range) -> Result<String> {
    serde_json::to_string_pretty(range).context("Failed to encode range as JSON")
}
