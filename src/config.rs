use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub profile_api_base_url: String,
    pub profile_api_token: String,
    /// TTL for cached upstream profile payloads, in seconds.
    pub profile_cache_ttl_secs: u64,
    /// TTL for locally stored drafts, in seconds.
    pub draft_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            profile_api_base_url: std::env::var("PROFILE_API_BASE_URL")
                .map_err(|_| {
                    anyhow::anyhow!("PROFILE_API_BASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("PROFILE_API_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("PROFILE_API_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })?,
            profile_api_token: std::env::var("PROFILE_API_TOKEN")
                .map_err(|_| anyhow::anyhow!("PROFILE_API_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("PROFILE_API_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            profile_cache_ttl_secs: std::env::var("PROFILE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PROFILE_CACHE_TTL_SECS must be a valid number"))?,
            draft_ttl_secs: std::env::var("DRAFT_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string()) // 7 days
                .parse()
                .map_err(|_| anyhow::anyhow!("DRAFT_TTL_SECS must be a valid number"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Profile API base URL: {}", config.profile_api_base_url);
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!(
            "Profile cache TTL: {}s, draft TTL: {}s",
            config.profile_cache_ttl_secs,
            config.draft_ttl_secs
        );

        Ok(config)
    }
}
