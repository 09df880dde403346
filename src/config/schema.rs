use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Remote used to detect the repository when --owner/--repo are not given
    pub remote: Option<String>,
    /// Commits fetched per page during the history walk
    pub page_size: Option<u8>,
}
