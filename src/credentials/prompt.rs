use anyhow::{Context, Result};

use super::{get_stored_token, get_token_from_env, get_token_path, store_token, CredentialError};

/// Prompts user to enter a GitHub personal access token
pub fn prompt_for_token() -> Result<String> {
    println!("GitHub personal access token required.");
    println!("Create one at: https://github.com/settings/tokens");
    println!("Required scopes: repo (for private repos) or public_repo (for public only)");
    println!();

    let token =
        rpassword::prompt_password("Enter token: ").context("Failed to read token from stdin")?;

    let token = token.trim();

    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    Ok(token.to_string())
}

/// Resolve a token: the GITHUB_TOKEN environment variable wins, then the
/// stored token file, then an interactive prompt whose answer is stored
/// for the next run.
pub fn setup_token_if_missing() -> Result<String> {
    if let Some(token) = get_token_from_env() {
        return Ok(token);
    }

    match get_stored_token() {
        Ok(token) => Ok(token),
        Err(CredentialError::TokenNotFound) => {
            let token = prompt_for_token()?;

            store_token(&token).context("Failed to store token")?;
            println!("Token stored in {}", get_token_path().display());

            Ok(token)
        }
        Err(e) => anyhow::bail!("Failed to read stored token: {}", e),
    }
}
