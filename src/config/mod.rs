use std::path::PathBuf;

use serde::Deserialize;
use tracing::error;

const DEFAULT_PORT: u16 = 4400;
const DEFAULT_LOG: &str = "info";
const DEFAULT_LOG_FORMAT: &str = "pretty";
const DEFAULT_ENTRIES_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 100;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REPOSITORY_TIMEOUT_SECS: u64 = 10;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `sparkd.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 4400).
    port: Option<u16>,
    /// Bind address (default: "127.0.0.1"; use "0.0.0.0" to serve beyond loopback).
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,sparkd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Base URL of the hosted entries backend (GoTrue auth + PostgREST wins table).
    entries_url: Option<String>,
    /// Publishable API key sent alongside every entries-backend request.
    entries_anon_key: Option<String>,
    /// Base URL of the completion provider (default: https://api.openai.com).
    provider_url: Option<String>,
    /// Secret API key for the completion provider. Omit to rely on the env var.
    provider_api_key: Option<String>,
    /// Completion model id (default: gpt-3.5-turbo).
    model: Option<String>,
    /// Maximum output tokens per Spark message (default: 100).
    max_tokens: Option<u32>,
    /// Sampling temperature — varied but coherent phrasing (default: 0.7).
    temperature: Option<f32>,
    /// Request timeout for the provider call in seconds (default: 30).
    provider_timeout_secs: Option<u64>,
    /// Request timeout for entries-backend calls in seconds (default: 10).
    repository_timeout_secs: Option<u64>,
}

fn load_toml(path: &PathBuf) -> Option<TomlConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config file — using defaults");
            None
        }
    }
}

// ─── SparkConfig ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SparkConfig {
    pub port: u16,
    pub bind_address: String,
    pub log: String,
    /// "pretty" | "json".
    pub log_format: String,
    /// Entries backend base URL (no trailing slash).
    pub entries_url: String,
    /// Publishable key for the entries backend ("anon" key in the hosted platform).
    pub entries_anon_key: String,
    /// Completion provider base URL (no trailing slash).
    pub provider_url: String,
    /// Provider secret key. None means unconfigured — calls will be rejected
    /// upstream, which surfaces as an Upstream error per request.
    pub provider_api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub provider_timeout_secs: u64,
    pub repository_timeout_secs: u64,
}

impl SparkConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file (default path: ./sparkd.toml)
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        bind_address: Option<String>,
        log: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Self {
        let path = config_path.unwrap_or_else(|| PathBuf::from("sparkd.toml"));
        let toml = load_toml(&path).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);
        let log = log.or(toml.log).unwrap_or_else(|| DEFAULT_LOG.to_string());

        let log_format = std::env::var("SPARKD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string());

        let entries_url = std::env::var("SPARKD_ENTRIES_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.entries_url)
            .unwrap_or_else(|| DEFAULT_ENTRIES_URL.to_string());

        let entries_anon_key = std::env::var("SPARKD_ENTRIES_ANON_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.entries_anon_key)
            .unwrap_or_default();

        let provider_url = std::env::var("SPARKD_PROVIDER_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.provider_url)
            .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string());

        // OPENAI_API_KEY is accepted as a fallback name — it is what the
        // hosting dashboards already store for this service.
        let provider_api_key = std::env::var("SPARKD_PROVIDER_API_KEY")
            .ok()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|s| !s.is_empty())
            .or(toml.provider_api_key);

        let model = std::env::var("SPARKD_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = toml.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let temperature = toml.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        let provider_timeout_secs = toml
            .provider_timeout_secs
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS);
        let repository_timeout_secs = toml
            .repository_timeout_secs
            .unwrap_or(DEFAULT_REPOSITORY_TIMEOUT_SECS);

        Self {
            port,
            bind_address,
            log,
            log_format,
            entries_url: entries_url.trim_end_matches('/').to_string(),
            entries_anon_key,
            provider_url: provider_url.trim_end_matches('/').to_string(),
            provider_api_key,
            model,
            max_tokens,
            temperature,
            provider_timeout_secs,
            repository_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path guaranteed not to exist, so no TOML layer is picked up.
    fn no_config() -> Option<PathBuf> {
        Some(PathBuf::from("/nonexistent/sparkd.toml"))
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let cfg = SparkConfig::new(None, None, None, no_config());
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.bind_address, "127.0.0.1");
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.max_tokens, 100);
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn toml_layer_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparkd.toml");
        std::fs::write(
            &path,
            r#"
port = 9999
entries_url = "https://example.supabase.co/"
model = "gpt-4o-mini"
max_tokens = 64
"#,
        )
        .unwrap();

        let cfg = SparkConfig::new(None, None, None, Some(path));
        assert_eq!(cfg.port, 9999);
        // trailing slash is normalized away
        assert_eq!(cfg.entries_url, "https://example.supabase.co");
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.max_tokens, 64);
    }

    #[test]
    fn cli_beats_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparkd.toml");
        std::fs::write(&path, "port = 9999\nbind_address = \"0.0.0.0\"\n").unwrap();

        let cfg = SparkConfig::new(Some(4444), None, Some("debug".into()), Some(path));
        assert_eq!(cfg.port, 4444, "CLI port must win over TOML");
        assert_eq!(cfg.bind_address, "0.0.0.0", "TOML still fills unset fields");
        assert_eq!(cfg.log, "debug");
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparkd.toml");
        std::fs::write(&path, "port = \"not a number").unwrap();

        let cfg = SparkConfig::new(None, None, None, Some(path));
        assert_eq!(cfg.port, DEFAULT_PORT);
    }
}
