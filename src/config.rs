//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for reviewd.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set (mock mode excepted: real reviews
/// need `REVIEWD_LLM_API_KEY`).
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite (or other) database URL (default: `"sqlite://reviewd.db?mode=rwc"`).
    /// Supports any sqlx-compatible connection string.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When `true`, the review generator returns a fixed review without
    /// contacting any external system. Used for testing without a network
    /// dependency.
    pub mock_reviews: bool,

    /// Base URL of the OpenAI-compatible provider, without a trailing slash
    /// (default: `"https://api.openai.com/v1"`).
    pub llm_api_base: String,

    /// Bearer token for the provider. Empty in mock mode.
    pub llm_api_key: String,

    /// Model identifier sent with each completion request.
    pub llm_model: String,

    /// Per-request timeout for the provider call, in seconds. A slow or
    /// failing provider fails the request instead of stalling it forever.
    pub llm_timeout_secs: u64,

    /// Comma-separated list of allowed CORS origins; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Serve `/swagger-ui`; disable in production deployments.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("REVIEWD_BIND", "0.0.0.0:3000"),
            database_url: env_or("REVIEWD_DATABASE_URL", "sqlite://reviewd.db?mode=rwc"),
            log_level: env_or("REVIEWD_LOG", "info"),
            log_json: env_flag("REVIEWD_LOG_JSON", false),
            mock_reviews: env_flag("REVIEWD_MOCK_REVIEWS", false),
            llm_api_base: env_or("REVIEWD_LLM_API_BASE", "https://api.openai.com/v1"),
            llm_api_key: env_or("REVIEWD_LLM_API_KEY", ""),
            llm_model: env_or("REVIEWD_LLM_MODEL", "gpt-4o-mini"),
            llm_timeout_secs: parse_env("REVIEWD_LLM_TIMEOUT_SECS", 30),
            cors_allowed_origins: std::env::var("REVIEWD_CORS_ORIGINS").ok(),
            enable_swagger: env_flag("REVIEWD_ENABLE_SWAGGER", true),
        }
    }
}

#[cfg(test)]
impl Config {
    /// Mock-mode configuration backed by an in-memory database; the provider
    /// base points at a closed port so an accidental network call fails fast.
    pub fn mock() -> Self {
        Self {
            bind_address: "127.0.0.1:0".into(),
            database_url: "sqlite::memory:".into(),
            log_level: "info".into(),
            log_json: false,
            mock_reviews: true,
            llm_api_base: "http://127.0.0.1:1/v1".into(),
            llm_api_key: String::new(),
            llm_model: "test-model".into(),
            llm_timeout_secs: 1,
            cors_allowed_origins: None,
            enable_swagger: false,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
