pub mod prompt;

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;

/// Environment variable checked before any stored token
pub const ENV_TOKEN_VAR: &str = "GITHUB_TOKEN";

// Re-export prompt functions for convenience
pub use prompt::{prompt_for_token, setup_token_if_missing};

#[derive(Debug)]
pub enum CredentialError {
    TokenNotFound,
    ReadFailed(String),
    StoreFailed(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::TokenNotFound => write!(f, "No stored token found"),
            CredentialError::ReadFailed(msg) => write!(f, "Failed to read token: {}", msg),
            CredentialError::StoreFailed(msg) => write!(f, "Failed to store token: {}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Path of the stored token file (~/.config/gh-changelog/token)
pub fn get_token_path() -> PathBuf {
    crate::config::get_config_dir().join("token")
}

/// Check for a GitHub token in the GITHUB_TOKEN environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    match std::env::var(ENV_TOKEN_VAR) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Retrieve the token stored in the config directory
pub fn get_stored_token() -> Result<String, CredentialError> {
    read_token_from(&get_token_path())
}

/// Store a token in the config directory
pub fn store_token(token: &str) -> Result<(), CredentialError> {
    crate::config::ensure_config_dir()
        .map_err(|e| CredentialError::StoreFailed(format!("{}", e)))?;
    write_token_to(&get_token_path(), token)
}

fn read_token_from(path: &Path) -> Result<String, CredentialError> {
    if !path.exists() {
        return Err(CredentialError::TokenNotFound);
    }

    let contents =
        fs::read_to_string(path).map_err(|e| CredentialError::ReadFailed(format!("{}", e)))?;

    let token = contents.trim().to_string();
    if token.is_empty() {
        return Err(CredentialError::TokenNotFound);
    }

    Ok(token)
}

/// Write the token file atomically so an interrupted run never leaves a
/// truncated token behind.
fn write_token_to(path: &Path, token: &str) -> Result<(), CredentialError> {
    let mut file = AtomicWriteFile::open(path)
        .map_err(|e| CredentialError::StoreFailed(format!("{}", e)))?;

    writeln!(file, "{}", token).map_err(|e| CredentialError::StoreFailed(format!("{}", e)))?;

    file.commit()
        .map_err(|e| CredentialError::StoreFailed(format!("{}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_token_file_roundtrip() {
        let path = env::temp_dir().join("gh_changelog_token_roundtrip");
        let _ = fs::remove_file(&path);

        write_token_to(&path, "ghp_test_12345").unwrap();
        let token = read_token_from(&path).unwrap();
        assert_eq!(token, "ghp_test_12345");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_token_file_is_not_found() {
        let path = env::temp_dir().join("gh_changelog_token_missing");
        let _ = fs::remove_file(&path);

        assert!(matches!(
            read_token_from(&path),
            Err(CredentialError::TokenNotFound)
        ));
    }

    #[test]
    fn test_blank_token_file_is_not_found() {
        let path = env::temp_dir().join("gh_changelog_token_blank");
        fs::write(&path, "  \n").unwrap();

        assert!(matches!(
            read_token_from(&path),
            Err(CredentialError::TokenNotFound)
        ));

        let _ = fs::remove_file(&path);
    }
}
