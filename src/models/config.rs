//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::PAGE_SIZE;

fn default_page_size() -> usize {
    PAGE_SIZE
}

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by the repository and the command line client.
pub struct AppConfig {
    /// Find-people endpoint of the external lead-search API.
    pub find_people_url: String,
    /// Base URL of the backend auth/profile service.
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Unset means requests may wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    pub session_file: String,
    /// Lead-search key used when none is given on the command line.
    #[serde(default)]
    pub api_key: Option<String>,
}
