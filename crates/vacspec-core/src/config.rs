use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; the SerpAPI key is the only optional one and
/// its absence switches source discovery off rather than failing startup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("VACSPEC_ENV", "development"));
    let bind_addr = parse_addr("VACSPEC_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("VACSPEC_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "VACSPEC_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    // An empty key is as good as no key.
    let serpapi_key = lookup("SERPAPI_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let serpapi_base_url = or_default("VACSPEC_SERPAPI_BASE_URL", "https://serpapi.com")
        .trim_end_matches('/')
        .to_string();

    let fetch_timeout_ms = parse_u64("VACSPEC_FETCH_TIMEOUT_MS", "2500")?;
    let resolve_budget_ms = parse_u64("VACSPEC_RESOLVE_BUDGET_MS", "12000")?;
    let user_agent = or_default("VACSPEC_USER_AGENT", DEFAULT_USER_AGENT);
    let max_links_per_query = parse_usize("VACSPEC_MAX_LINKS_PER_QUERY", "3")?;
    let cache_ttl_secs = parse_u64("VACSPEC_CACHE_TTL_SECS", "86400")?;
    let snippet_limit = parse_usize("VACSPEC_SNIPPET_LIMIT", "3")?;
    let batch_limit = parse_usize("VACSPEC_BATCH_LIMIT", "24")?;
    let rate_limit_per_minute = parse_usize("VACSPEC_RATE_LIMIT_PER_MINUTE", "120")?;

    if fetch_timeout_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VACSPEC_FETCH_TIMEOUT_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if resolve_budget_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VACSPEC_RESOLVE_BUDGET_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if max_links_per_query == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VACSPEC_MAX_LINKS_PER_QUERY".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        sources_path,
        serpapi_key,
        serpapi_base_url,
        fetch_timeout_ms,
        resolve_budget_ms,
        user_agent,
        max_links_per_query,
        cache_ttl_secs,
        snippet_limit,
        batch_limit,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
