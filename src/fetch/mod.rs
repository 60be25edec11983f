use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::config::{BrowserSettings, ConfigError};

pub mod browser;
pub mod direct;

pub use browser::RemoteBrowser;
pub use direct::HttpFallback;

/// Markup at or below this many bytes counts as a failed load.
pub const MIN_HTML_LEN: usize = 200;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Remote browser rejected the credentials: {0}")]
    AuthRejected(String),
    #[error("Browser session error: {0}")]
    Session(String),
    #[error("Page load timed out: {0}")]
    Timeout(String),
    #[error("Received empty/short HTML content ({0} bytes)")]
    ShortContent(usize),
    #[error("Failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
    #[error("Upstream returned status {0}")]
    Upstream(u16),
    #[error("{0}")]
    Request(String),
    #[error("{primary}; fallback scraping failed as well: {fallback}")]
    FallbackFailed {
        primary: Box<FetchError>,
        fallback: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another browser attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Session(_) | FetchError::Timeout(_) | FetchError::ShortContent(_)
        )
    }

    /// Follow-up advice shown next to the error.
    pub fn hint(&self) -> &'static str {
        match self {
            FetchError::Config(_) | FetchError::AuthRejected(_) => {
                "Fix AUTH=username:password in your environment."
            }
            FetchError::InvalidUrl(_) => "Enter a full http:// or https:// URL.",
            _ => "Please check the URL and try again. Make sure the website is accessible.",
        }
    }
}

// ── Page sources ─────────────────────────────────────────────────────────────

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// ── Retry ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Sleep after the given failed attempt (1-based): `base * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
/// `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        tracing::info!("Attempt {}/{}", attempt, max_attempts);
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    last: Box::new(e),
                })
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!("attempt {} failed: {} (retrying in {:?})", attempt, e, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

// ── Fetcher ──────────────────────────────────────────────────────────────────

pub struct Fetcher {
    primary: Box<dyn PageSource>,
    fallback: Option<Box<dyn PageSource>>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(
        primary: Box<dyn PageSource>,
        fallback: Option<Box<dyn PageSource>>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            primary,
            fallback,
            policy,
        }
    }

    /// Remote browser first, plain HTTP as a last resort when enabled.
    pub fn from_settings(settings: &BrowserSettings) -> Result<Self, FetchError> {
        let fallback: Option<Box<dyn PageSource>> = if settings.fallback_enabled {
            Some(Box::new(HttpFallback::new()?))
        } else {
            None
        };
        Ok(Self::new(
            Box::new(RemoteBrowser::new(settings)),
            fallback,
            RetryPolicy::new(settings.max_retries),
        ))
    }
}

#[async_trait]
impl PageSource for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        validate_url(url)?;

        let primary = retry_with_backoff(&self.policy, move |_| async move {
            let html = self.primary.fetch(url).await?;
            ensure_min_length(html)
        })
        .await;

        match (primary, &self.fallback) {
            (Ok(html), _) => {
                tracing::info!("Scraped {} characters successfully.", html.len());
                Ok(html)
            }
            (Err(e @ FetchError::Exhausted { .. }), Some(fallback)) => {
                tracing::warn!("Main scraper failed → {}", e);
                tracing::info!("Attempting fallback HTTP scraper...");
                fallback.fetch(url).await.map_err(|fb| {
                    tracing::error!("Fallback failed: {}", fb);
                    FetchError::FallbackFailed {
                        primary: Box::new(e),
                        fallback: Box::new(fb),
                    }
                })
            }
            (Err(e), _) => Err(e),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn validate_url(url: &str) -> Result<(), FetchError> {
    let parsed =
        Url::parse(url).map_err(|_| FetchError::InvalidUrl("Invalid URL".to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(FetchError::InvalidUrl(
            "Only http and https URLs are allowed".to_string(),
        )),
    }
}

fn ensure_min_length(html: String) -> Result<String, FetchError> {
    if html.len() > MIN_HTML_LEN {
        Ok(html)
    } else {
        Err(FetchError::ShortContent(html.len()))
    }
}
