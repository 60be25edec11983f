use std::time::Duration;

// ── Defaults ─────────────────────────────────────────────────────────────────

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_BROWSER_ENDPOINT: &str = "brd.superproxy.io:9515";
const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";
const DEFAULT_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CHUNK_SIZE: usize = 6000;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("AUTH not found. Add AUTH=username:password to your environment")]
    MissingAuth,
    #[error("Invalid AUTH format. Expected username:password")]
    InvalidAuth,
}

// ── Browser credentials ──────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq)]
pub struct BrowserCredentials {
    pub username: String,
    pub password: String,
}

impl BrowserCredentials {
    /// Parse a raw `username:password` value.
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty());
        let raw = raw.ok_or(ConfigError::MissingAuth)?;
        let (username, password) = raw.split_once(':').ok_or(ConfigError::InvalidAuth)?;
        if username.is_empty() {
            return Err(ConfigError::InvalidAuth);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// WebDriver endpoint with the credentials embedded in the authority.
    /// `endpoint` is `host:port` (served over https) or a full base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let (scheme, authority) = endpoint.split_once("://").unwrap_or(("https", endpoint));
        format!("{}://{}:{}@{}", scheme, self.username, self.password, authority)
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for BrowserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Raw `AUTH` value; validated on every fetch so a bad value surfaces as a
    /// user-facing configuration error instead of a startup crash.
    pub auth: Option<String>,
    pub endpoint: String,
    pub max_retries: u32,
    pub page_load_timeout: Duration,
    pub fallback_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one model call, connect included.
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub chunk_size: usize,
    pub browser: BrowserSettings,
    pub llm: LlmSettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secret = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            bind_addr: text("BIND_ADDR", DEFAULT_BIND_ADDR),
            chunk_size: parsed(&lookup, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE),
            browser: BrowserSettings {
                auth: lookup("AUTH"),
                endpoint: text("BROWSER_ENDPOINT", DEFAULT_BROWSER_ENDPOINT),
                max_retries: parsed(&lookup, "SCRAPER_MAX_RETRIES", DEFAULT_MAX_RETRIES),
                page_load_timeout: Duration::from_secs(parsed(
                    &lookup,
                    "SCRAPER_PAGE_LOAD_TIMEOUT_SECS",
                    DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
                )),
                fallback_enabled: parsed_flag(&lookup, "SCRAPER_FALLBACK", true),
            },
            llm: LlmSettings {
                api_key: secret("TOGETHER_API_KEY"),
                base_url: text("TOGETHER_BASE_URL", DEFAULT_TOGETHER_BASE_URL),
                model: text("TOGETHER_MODEL", DEFAULT_MODEL),
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
                request_timeout: Duration::from_secs(parsed(
                    &lookup,
                    "TOGETHER_TIMEOUT_SECS",
                    DEFAULT_LLM_TIMEOUT_SECS,
                )),
            },
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("ignoring unparseable {}={:?}, using default", key, raw);
                default
            }
        },
    }
}

fn parsed_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        None => default,
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!("ignoring unparseable {}={:?}, using default", key, v);
                default
            }
        },
    }
}
