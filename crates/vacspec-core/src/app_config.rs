use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// YAML allow-list file; the built-in tables are used when it is absent.
    pub sources_path: PathBuf,
    /// `None` disables source discovery entirely.
    pub serpapi_key: Option<String>,
    pub serpapi_base_url: String,
    pub fetch_timeout_ms: u64,
    /// Upper bound on a whole resolution across all tiers.
    pub resolve_budget_ms: u64,
    pub user_agent: String,
    pub max_links_per_query: usize,
    pub cache_ttl_secs: u64,
    pub snippet_limit: usize,
    pub batch_limit: usize,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field(
                "serpapi_key",
                &self.serpapi_key.as_ref().map(|_| "[redacted]"),
            )
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("fetch_timeout_ms", &self.fetch_timeout_ms)
            .field("resolve_budget_ms", &self.resolve_budget_ms)
            .field("user_agent", &self.user_agent)
            .field("max_links_per_query", &self.max_links_per_query)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("snippet_limit", &self.snippet_limit)
            .field("batch_limit", &self.batch_limit)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
