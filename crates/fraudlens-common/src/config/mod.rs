//! Configuration loading for FraudLens.
//! Reads fraudlens.toml from the current directory or the path in FRAUDLENS_CONFIG,
//! then applies environment overrides. The inference credential only ever comes
//! from the environment and is required: `AppConfig::load` fails without it.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{FraudlensError, Result};

/// Environment variables checked (in order) for the inference credential.
pub const API_KEY_VARS: [&str; 2] = ["FRAUDLENS_API_KEY", "API_KEY"];

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

fn default_base_url() -> String { "https://api.groq.com/openai".to_string() }
fn default_inference_timeout() -> u64 { 60 }

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_inference_timeout(),
            max_tokens: None,
            temperature: None,
            api_key: None,
        }
    }
}

impl InferenceConfig {
    /// The validated credential. Only fails on a config that skipped `validate`.
    pub fn api_key(&self) -> Result<&SecretString> {
        self.api_key
            .as_ref()
            .ok_or_else(|| FraudlensError::Config(missing_key_message()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_text_model")]
    pub text: String,
    #[serde(default = "default_vision_model")]
    pub vision: String,
}

fn default_text_model()   -> String { "llama-3.3-70b-versatile".to_string() }
fn default_vision_model() -> String { "llama-3.2-11b-vision-preview".to_string() }

impl Default for ModelConfig {
    fn default() -> Self {
        Self { text: default_text_model(), vision: default_vision_model() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_max_attempts() -> u32 { 3 }
fn default_delay_ms()     -> u64 { 1_000 }
fn default_fallback()     -> String { "The reasoning engine is currently over capacity.".to_string() }

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            fallback: default_fallback(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    #[serde(alias = "duck_duck_go", alias = "ddg")]
    DuckDuckGo,
    Brave,
}

impl std::str::FromStr for SearchProviderKind {
    type Err = FraudlensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "duckduckgo" | "duck_duck_go" | "ddg" => Ok(SearchProviderKind::DuckDuckGo),
            "brave" => Ok(SearchProviderKind::Brave),
            other => Err(FraudlensError::Config(format!(
                "unknown search provider '{other}': expected duckduckgo or brave"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_provider")]
    pub provider: SearchProviderKind,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
    #[serde(default = "default_steering_suffix")]
    pub steering_suffix: String,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
    #[serde(skip)]
    pub brave_api_key: Option<SecretString>,
}

fn default_provider()        -> SearchProviderKind { SearchProviderKind::DuckDuckGo }
fn default_num_results()     -> usize { 2 }
fn default_steering_suffix() -> String { "MFSA cybersecurity compliance trading risk".to_string() }
fn default_search_timeout()  -> u64 { 15 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            num_results: default_num_results(),
            steering_suffix: default_steering_suffix(),
            timeout_secs: default_search_timeout(),
            brave_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_idle_minutes")]
    pub session_idle_minutes: u64,
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_bind()           -> String { "127.0.0.1:8501".to_string() }
fn default_idle_minutes()   -> u64 { 120 }
fn default_max_upload()     -> usize { 10 * 1024 * 1024 }
fn default_audit_capacity() -> usize { 200 }

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_idle_minutes: default_idle_minutes(),
            max_upload_bytes: default_max_upload(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl WebConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }
}

fn missing_key_message() -> String {
    format!(
        "no inference credential: set {} (or {})",
        API_KEY_VARS[0], API_KEY_VARS[1]
    )
}

#[cfg(test)]
mod tests;

impl AppConfig {
    /// Load, override from the process environment, and validate.
    pub fn load() -> Result<Self> {
        let path = std::env::var("FRAUDLENS_CONFIG")
            .unwrap_or_else(|_| "fraudlens.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            tracing::debug!(path = %path, "Reading configuration file");
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path, "No configuration file, using defaults");
            Self::default()
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|name| get(name)) {
            self.inference.api_key = Some(SecretString::from(key));
        }
        if let Some(url) = get("FRAUDLENS_BASE_URL") {
            self.inference.base_url = url;
        }
        if let Some(model) = get("FRAUDLENS_TEXT_MODEL") {
            self.models.text = model;
        }
        if let Some(model) = get("FRAUDLENS_VISION_MODEL") {
            self.models.vision = model;
        }
        if let Some(bind) = get("FRAUDLENS_BIND") {
            self.web.bind = bind;
        }
        if let Some(provider) = get("FRAUDLENS_SEARCH_PROVIDER") {
            match provider.parse() {
                Ok(kind) => self.search.provider = kind,
                Err(e) => tracing::warn!("Ignoring FRAUDLENS_SEARCH_PROVIDER: {e}"),
            }
        }
        if let Some(key) = get("BRAVE_API_KEY") {
            self.search.brave_api_key = Some(SecretString::from(key));
        }
    }

    /// Fail fast on anything that would otherwise only break on first use.
    pub fn validate(&self) -> Result<()> {
        match &self.inference.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => {}
            _ => return Err(FraudlensError::Config(missing_key_message())),
        }
        if self.retry.max_attempts == 0 {
            return Err(FraudlensError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.search.num_results == 0 {
            return Err(FraudlensError::Config("search.num_results must be at least 1".into()));
        }
        if self.search.provider == SearchProviderKind::Brave && self.search.brave_api_key.is_none() {
            return Err(FraudlensError::Config(
                "search.provider = \"brave\" requires BRAVE_API_KEY".into(),
            ));
        }
        Ok(())
    }
}
