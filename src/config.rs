use std::env;

use crate::error::Error;

/// Runtime configuration for the EdgeShield API client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub per_page: u32,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - EDGE_API_TOKEN [required]
    /// - EDGE_API_URL (default: https://api.edgeshield.dev/client/v4)
    /// - EDGE_HTTP_TIMEOUT_SECS (default: 30)
    /// - EDGE_PER_PAGE (default: 50; page size for list calls)
    /// - EDGE_USER_AGENT (default: edgelimit/<version>)
    pub fn from_env() -> Result<Self, Error> {
        let token = env::var("EDGE_API_TOKEN")
            .map_err(|_| Error::Configuration("Missing EDGE_API_TOKEN".to_string()))?;

        let api_url = env::var("EDGE_API_URL")
            .unwrap_or_else(|_| "https://api.edgeshield.dev/client/v4".to_string());
        url::Url::parse(&api_url)
            .map_err(|e| Error::Configuration(format!("Invalid EDGE_API_URL: {e}")))?;
        let api_url = api_url.trim_end_matches('/').to_string();

        let timeout_secs = env::var("EDGE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let per_page = env::var("EDGE_PER_PAGE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|p| (1..=1000).contains(p))
            .unwrap_or(50);
        let default_ua = format!("edgelimit/{}", env!("CARGO_PKG_VERSION"));
        let user_agent = env::var("EDGE_USER_AGENT").unwrap_or(default_ua);

        Ok(Self {
            token,
            api_url,
            user_agent,
            timeout_secs,
            per_page,
        })
    }
}
