use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub mode: OperationMode,
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    Standard, // Full comment pages, polite delays
    Debug,    // Two comments, short delays
}

impl OperationMode {
    pub fn comment_limit(self) -> usize {
        match self {
            OperationMode::Standard => 10,
            OperationMode::Debug => 2,
        }
    }

    pub fn post_fetch_delay(self) -> Duration {
        match self {
            OperationMode::Standard => Duration::from_secs(1),
            OperationMode::Debug => Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub target_count: usize,
    pub request_timeout_secs: u64,
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub min_interval_ms: u64,
    pub backoff_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    File,
    Kv,
}

impl CacheBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheBackend::File => "file",
            CacheBackend::Kv => "kv",
        }
    }
}

impl FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(CacheBackend::File),
            "kv" => Ok(CacheBackend::Kv),
            other => bail!("Unknown cache backend '{other}', expected 'file' or 'kv'"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub path: PathBuf,
    pub kv_url: Option<String>,
    #[serde(skip_serializing)]
    pub kv_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(skip_serializing)]
    pub google_places_api_key: Option<String>,
    pub reddit_user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: OperationMode::Standard,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            pipeline: PipelineConfig {
                target_count: 10,
                request_timeout_secs: 300,
            },
            rate_limit: RateLimitConfig {
                min_interval_ms: 1000,
                backoff_ms: 2000,
            },
            cache: CacheConfig {
                backend: CacheBackend::File,
                path: PathBuf::from("data/locations_database.json"),
                kv_url: None,
                kv_token: None,
            },
            credentials: Credentials {
                google_places_api_key: None,
                reddit_user_agent: concat!("trailscout/", env!("CARGO_PKG_VERSION")).to_string(),
            },
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {key}: '{raw}'")),
        _ => Ok(default),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let debug = parse_or(&lookup, "DEBUG_MODE", false)?;
        let mode = if debug {
            OperationMode::Debug
        } else {
            OperationMode::Standard
        };

        let cache = CacheConfig {
            backend: parse_or(&lookup, "CACHE_BACKEND", defaults.cache.backend)?,
            path: lookup("CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache.path),
            kv_url: non_empty(lookup("KV_REST_API_URL")),
            kv_token: non_empty(lookup("KV_REST_API_TOKEN")),
        };
        if cache.backend == CacheBackend::Kv && (cache.kv_url.is_none() || cache.kv_token.is_none()) {
            bail!("CACHE_BACKEND=kv requires KV_REST_API_URL and KV_REST_API_TOKEN");
        }

        let config = Self {
            mode,
            server: ServerConfig {
                host: lookup("HOST").unwrap_or(defaults.server.host),
                port: parse_or(&lookup, "PORT", defaults.server.port)?,
            },
            pipeline: PipelineConfig {
                target_count: parse_or(&lookup, "TARGET_COUNT", defaults.pipeline.target_count)?,
                request_timeout_secs: parse_or(
                    &lookup,
                    "REQUEST_TIMEOUT_SECS",
                    defaults.pipeline.request_timeout_secs,
                )?,
            },
            rate_limit: RateLimitConfig {
                min_interval_ms: parse_or(
                    &lookup,
                    "PLACES_MIN_INTERVAL_MS",
                    defaults.rate_limit.min_interval_ms,
                )?,
                backoff_ms: parse_or(&lookup, "PLACES_BACKOFF_MS", defaults.rate_limit.backoff_ms)?,
            },
            cache,
            credentials: Credentials {
                google_places_api_key: non_empty(lookup("GOOGLE_PLACES_API_KEY")),
                reddit_user_agent: non_empty(lookup("REDDIT_USER_AGENT"))
                    .unwrap_or(defaults.credentials.reddit_user_agent),
            },
        };

        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        tracing::info!(
            mode = ?self.mode,
            addr = %self.server.addr(),
            cache_backend = self.cache.backend.as_str(),
            places_api_key = self.credentials.google_places_api_key.is_some(),
            "Config loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.mode, OperationMode::Standard);
        assert_eq!(config.server.addr(), "0.0.0.0:8000");
        assert_eq!(config.pipeline.target_count, 10);
        assert_eq!(config.pipeline.request_timeout(), Duration::from_secs(300));
        assert_eq!(config.cache.backend, CacheBackend::File);
        assert!(config.credentials.google_places_api_key.is_none());
    }

    #[test]
    fn test_debug_mode() {
        let config = load(&[("DEBUG_MODE", "true")]).unwrap();
        assert_eq!(config.mode, OperationMode::Debug);
        assert_eq!(config.mode.comment_limit(), 2);
        assert_eq!(config.mode.post_fetch_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "9000"),
            ("PLACES_MIN_INTERVAL_MS", "250"),
            ("GOOGLE_PLACES_API_KEY", "abc"),
            ("CACHE_PATH", "/tmp/cache.json"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.rate_limit.min_interval_ms, 250);
        assert_eq!(config.credentials.google_places_api_key.as_deref(), Some("abc"));
        assert_eq!(config.cache.path, PathBuf::from("/tmp/cache.json"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("CACHE_BACKEND", "redis")]).is_err());
        assert!(load(&[("CACHE_BACKEND", "kv")]).is_err());
        assert!(load(&[
            ("CACHE_BACKEND", "kv"),
            ("KV_REST_API_URL", "https://kv.example.com"),
            ("KV_REST_API_TOKEN", "token"),
        ])
        .is_ok());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = load(&[("GOOGLE_PLACES_API_KEY", "secret-key")]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
