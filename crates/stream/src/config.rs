//! Provider configuration, loaded from the environment.

/// Connection settings for the Cloudflare Stream API.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Cloudflare account identifier.
    pub account_id: String,
    /// API token with Stream read/write permission.
    pub api_token: String,
    /// API base URL. Overridable for tests against a mock server.
    pub api_base: String,
    /// Upper bound accepted for a single upload, in seconds.
    pub max_duration_seconds: u32,
}

const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const DEFAULT_MAX_DURATION_SECONDS: u32 = 3600;

impl StreamConfig {
    /// Load from `CLOUDFLARE_*` environment variables. Returns `None`
    /// when the account id or token is absent, in which case the
    /// service runs without upload support.
    pub fn from_env() -> Option<Self> {
        let account_id = std::env::var("CLOUDFLARE_ACCOUNT_ID").ok()?;
        let api_token = std::env::var("CLOUDFLARE_API_TOKEN").ok()?;
        let api_base =
            std::env::var("CLOUDFLARE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let max_duration_seconds = std::env::var("CLOUDFLARE_MAX_DURATION_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_DURATION_SECONDS);
        Some(Self {
            account_id,
            api_token,
            api_base,
            max_duration_seconds,
        })
    }
}
