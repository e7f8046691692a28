use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults_match_dashboard_models() {
    let config = AppConfig::default();
    assert_eq!(config.models.text, "llama-3.3-70b-versatile");
    assert_eq!(config.models.vision, "llama-3.2-11b-vision-preview");
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.delay_ms, 1_000);
    assert_eq!(config.search.num_results, 2);
    assert_eq!(config.search.provider, SearchProviderKind::DuckDuckGo);
}

#[test]
fn test_missing_credential_fails_fast() {
    let config = AppConfig::default();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("FRAUDLENS_API_KEY"));
}

#[test]
fn test_blank_credential_is_ignored() {
    let mut config = AppConfig::default();
    config.apply_env_overrides(env(&[("FRAUDLENS_API_KEY", "   ")]));
    assert!(config.validate().is_err());
}

#[test]
fn test_legacy_api_key_variable_accepted() {
    let mut config = AppConfig::default();
    config.apply_env_overrides(env(&[("API_KEY", "gsk-test")]));
    config.validate().unwrap();
    assert_eq!(config.inference.api_key().unwrap().expose_secret(), "gsk-test");
}

#[test]
fn test_primary_key_wins_over_legacy() {
    let mut config = AppConfig::default();
    config.apply_env_overrides(env(&[("FRAUDLENS_API_KEY", "primary"), ("API_KEY", "legacy")]));
    assert_eq!(config.inference.api_key().unwrap().expose_secret(), "primary");
}

#[test]
fn test_toml_sections_override_defaults() {
    let config = AppConfig::from_toml_str(
        r#"
        [models]
        text = "llama-3.1-8b-instant"

        [retry]
        max_attempts = 5

        [search]
        provider = "brave"
        num_results = 4

        [web]
        bind = "0.0.0.0:9000"
        "#,
    )
    .unwrap();
    assert_eq!(config.models.text, "llama-3.1-8b-instant");
    assert_eq!(config.models.vision, "llama-3.2-11b-vision-preview");
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.delay_ms, 1_000);
    assert_eq!(config.search.provider, SearchProviderKind::Brave);
    assert_eq!(config.search.num_results, 4);
    assert_eq!(config.web.bind, "0.0.0.0:9000");
}

#[test]
fn test_toml_provider_names_match_env_names() {
    for name in ["duckduckgo", "duck_duck_go", "ddg"] {
        let config = AppConfig::from_toml_str(&format!("[search]\nprovider = \"{name}\"\n")).unwrap();
        assert_eq!(config.search.provider, SearchProviderKind::DuckDuckGo, "{name}");
        assert_eq!(name.parse::<SearchProviderKind>().unwrap(), SearchProviderKind::DuckDuckGo);
    }
    assert!(AppConfig::from_toml_str("[search]\nprovider = \"bing\"\n").is_err());
}

#[test]
fn test_huge_idle_window_saturates() {
    let web = WebConfig { session_idle_minutes: u64::MAX, ..WebConfig::default() };
    assert_eq!(web.session_idle(), Duration::from_secs(u64::MAX));
    assert_eq!(WebConfig::default().session_idle(), Duration::from_secs(120 * 60));
}

#[test]
fn test_brave_requires_key() {
    let mut config = AppConfig::from_toml_str("[search]\nprovider = \"brave\"\n").unwrap();
    config.apply_env_overrides(env(&[("FRAUDLENS_API_KEY", "k")]));
    assert!(config.validate().unwrap_err().to_string().contains("BRAVE_API_KEY"));

    config.apply_env_overrides(env(&[("BRAVE_API_KEY", "b")]));
    config.validate().unwrap();
}

#[test]
fn test_zero_attempts_rejected() {
    let mut config = AppConfig::from_toml_str("[retry]\nmax_attempts = 0\n").unwrap();
    config.apply_env_overrides(env(&[("FRAUDLENS_API_KEY", "k")]));
    assert!(config.validate().is_err());
}

#[test]
fn test_env_overrides_models_and_provider() {
    let mut config = AppConfig::default();
    config.apply_env_overrides(env(&[
        ("FRAUDLENS_TEXT_MODEL", "text-x"),
        ("FRAUDLENS_VISION_MODEL", "vision-x"),
        ("FRAUDLENS_SEARCH_PROVIDER", "bogus"),
        ("FRAUDLENS_BIND", "127.0.0.1:1"),
    ]));
    assert_eq!(config.models.text, "text-x");
    assert_eq!(config.models.vision, "vision-x");
    assert_eq!(config.search.provider, SearchProviderKind::DuckDuckGo);
    assert_eq!(config.web.bind, "127.0.0.1:1");
}

#[test]
fn test_zero_timeout_disables_it() {
    let mut config = AppConfig::default();
    assert_eq!(config.inference.timeout(), Some(Duration::from_secs(60)));
    config.inference.timeout_secs = 0;
    assert_eq!(config.inference.timeout(), None);
}
