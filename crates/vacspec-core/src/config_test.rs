use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults are valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.sources_path.to_string_lossy(), "./config/sources.yaml");
    assert!(cfg.serpapi_key.is_none());
    assert_eq!(cfg.serpapi_base_url, "https://serpapi.com");
    assert_eq!(cfg.fetch_timeout_ms, 2500);
    assert_eq!(cfg.resolve_budget_ms, 12_000);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.max_links_per_query, 3);
    assert_eq!(cfg.cache_ttl_secs, 86_400);
    assert_eq!(cfg.snippet_limit, 3);
    assert_eq!(cfg.batch_limit, 24);
    assert_eq!(cfg.rate_limit_per_minute, 120);
}

#[test]
fn build_app_config_reads_serpapi_key() {
    let mut map = HashMap::new();
    map.insert("SERPAPI_KEY", "  secret-key ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.serpapi_key.as_deref(), Some("secret-key"));
}

#[test]
fn build_app_config_treats_blank_serpapi_key_as_absent() {
    let mut map = HashMap::new();
    map.insert("SERPAPI_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.serpapi_key.is_none());
}

#[test]
fn build_app_config_strips_trailing_slash_from_serpapi_base_url() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_SERPAPI_BASE_URL", "http://127.0.0.1:9999/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.serpapi_base_url, "http://127.0.0.1:9999");
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VACSPEC_BIND_ADDR"),
        "expected InvalidEnvVar(VACSPEC_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fetch_timeout_override() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_FETCH_TIMEOUT_MS", "4000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fetch_timeout_ms, 4000);
}

#[test]
fn build_app_config_fetch_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_FETCH_TIMEOUT_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VACSPEC_FETCH_TIMEOUT_MS"),
        "expected InvalidEnvVar(VACSPEC_FETCH_TIMEOUT_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_fetch_timeout() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_FETCH_TIMEOUT_MS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn build_app_config_rejects_zero_resolve_budget() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_RESOLVE_BUDGET_MS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VACSPEC_RESOLVE_BUDGET_MS"),
        "expected InvalidEnvVar(VACSPEC_RESOLVE_BUDGET_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_max_links() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_MAX_LINKS_PER_QUERY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VACSPEC_MAX_LINKS_PER_QUERY"),
        "expected InvalidEnvVar(VACSPEC_MAX_LINKS_PER_QUERY), got: {result:?}"
    );
}

#[test]
fn build_app_config_cache_ttl_override() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_CACHE_TTL_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.cache_ttl_secs, 60);
}

#[test]
fn build_app_config_snippet_limit_invalid() {
    let mut map = HashMap::new();
    map.insert("VACSPEC_SNIPPET_LIMIT", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VACSPEC_SNIPPET_LIMIT"),
        "expected InvalidEnvVar(VACSPEC_SNIPPET_LIMIT), got: {result:?}"
    );
}

#[test]
fn app_config_debug_redacts_serpapi_key() {
    let mut map = HashMap::new();
    map.insert("SERPAPI_KEY", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
