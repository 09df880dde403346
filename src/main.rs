use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Colored terminal listing
    Text,
    /// Changelog fragment for release notes
    Markdown,
    /// Machine-readable dump of the resolved range
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "gh-changelog")]
#[command(
    about = "Generate a changelog from the commits and merged pull requests between two GitHub references",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Start reference (SHA, tag, or branch); excluded from the range
    start_ref: String,

    /// End reference (SHA, tag, or branch); defaults to the remote HEAD
    end_ref: Option<String>,

    /// Repository owner (requires --repo; default: detect from the local git remote)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name (requires --owner; default: detect from the local git remote)
    #[arg(long)]
    repo: Option<String>,

    /// Git remote to detect the repository from
    #[arg(long)]
    remote: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Commits fetched per page during the history walk
    #[arg(long)]
    page_size: Option<u8>,

    /// Bypass the resolved-range cache
    #[arg(long)]
    no_cache: bool,

    /// Clear the resolved-range cache before resolving
    #[arg(long)]
    clear_cache: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gh-changelog/config.yaml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match gh_changelog::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.clear_cache {
        if let Err(e) = gh_changelog::github::clear_cache() {
            eprintln!("Failed to clear cache: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
        if cli.verbose {
            eprintln!("Cache cleared");
        }
    }

    // Work out which repository to query: explicit flags win, otherwise
    // the configured git remote of the working directory.
    let repo = match (cli.owner, cli.repo) {
        (Some(owner), Some(name)) => gh_changelog::github::RepoId::new(owner, name),
        (None, None) => {
            let remote = cli
                .remote
                .or_else(|| config.remote.clone())
                .unwrap_or_else(|| gh_changelog::git::DEFAULT_REMOTE.to_string());

            match gh_changelog::git::detect_repository(&remote) {
                Ok(repo) => repo,
                Err(e) => {
                    eprintln!("Repository detection failed: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }
        _ => {
            eprintln!("--owner and --repo must be passed together.");
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!("Repository: {}", repo);
    }

    // Setup credentials (prompts for token on first run)
    let token = match gh_changelog::credentials::setup_token_if_missing() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Credential error: {}", e);
            std::process::exit(EXIT_AUTH);
        }
    };

    // Create GitHub client
    let client = match gh_changelog::github::create_client(&token) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create GitHub client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let page_size = cli.page_size.or(config.page_size);
    let api = gh_changelog::github::GithubApi::new(client, page_size);

    let cache = if cli.no_cache {
        None
    } else {
        Some(gh_changelog::github::RangeCache::new(
            gh_changelog::github::get_cache_path(),
        ))
    };

    let range = match gh_changelog::range::resolve_range(
        &api,
        &api,
        &repo,
        &cli.start_ref,
        cli.end_ref.as_deref(),
        cache.as_ref(),
        cli.verbose,
    )
    .await
    {
        Ok(range) => range,
        Err(e) => {
            eprintln!("Failed to resolve range: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let use_colors = gh_changelog::output::should_use_colors();
            println!("{}", gh_changelog::output::format_text(&range, use_colors));
        }
        OutputFormat::Markdown => {
            println!("{}", gh_changelog::output::format_markdown(&range));
        }
        OutputFormat::Json => match gh_changelog::output::format_json(&range) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
    }

    if cli.verbose {
        eprintln!();
        eprintln!(
            "Total: {} commits, {} pull requests in {:?}",
            range.commits().len(),
            range.pull_requests().len(),
            start_time.elapsed()
        );
    }

    std::process::exit(EXIT_SUCCESS);
}
