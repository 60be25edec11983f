use std::time::Duration;

use async_trait::async_trait;
use fantoccini::wd::{Capabilities, TimeoutConfiguration, WebDriverCompatibleCommand};
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Value};
use url::Url;

use super::{FetchError, PageSource};
use crate::config::{BrowserCredentials, BrowserSettings};

const IMPLICIT_WAIT: Duration = Duration::from_secs(10);
const CAPTCHA_DETECT_TIMEOUT_MS: u64 = 10_000;
const AUTH_REJECTED_NEEDLE: &str = "Wrong customer name";

const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-blink-features=AutomationControlled",
    "--disable-gpu",
    "--headless",
];

/// Headless Chrome on a remote WebDriver service. Every fetch opens a fresh
/// session and closes it before returning.
pub struct RemoteBrowser {
    auth: Option<String>,
    endpoint: String,
    page_load_timeout: Duration,
}

impl RemoteBrowser {
    pub fn new(settings: &BrowserSettings) -> Self {
        Self {
            auth: settings.auth.clone(),
            endpoint: settings.endpoint.clone(),
            page_load_timeout: settings.page_load_timeout,
        }
    }

    async fn connect(&self) -> Result<Client, FetchError> {
        let credentials = BrowserCredentials::parse(self.auth.as_deref())?;
        tracing::debug!("opening remote browser session at {}", self.endpoint);

        ClientBuilder::native()
            .capabilities(chrome_capabilities())
            .connect(&credentials.endpoint_url(&self.endpoint))
            .await
            .map_err(|e| classify_error(e.to_string()))
    }

    async fn load(&self, client: &Client, url: &str) -> Result<String, FetchError> {
        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(self.page_load_timeout),
                Some(IMPLICIT_WAIT),
            ))
            .await
            .map_err(|e| classify_error(e.to_string()))?;

        client
            .goto(url)
            .await
            .map_err(|e| classify_error(e.to_string()))?;
        tracing::info!("Page loaded successfully!");

        wait_for_captcha(client).await;

        client
            .source()
            .await
            .map_err(|e| classify_error(e.to_string()))
    }
}

#[async_trait]
impl PageSource for RemoteBrowser {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!("Connecting to remote browser → {}", url);
        let client = self.connect().await?;

        let result = self.load(&client, url).await;

        if let Err(e) = client.close().await {
            tracing::debug!("closing browser session failed: {}", e);
        }

        if let Err(e) = &result {
            tracing::error!("Browser error: {}", e);
        }
        result
    }
}

// ── Captcha handling ─────────────────────────────────────────────────────────

/// Vendor CDP passthrough that blocks until the service has solved any
/// captcha it detected on the page.
#[derive(Debug)]
struct WaitForCaptcha {
    detect_timeout_ms: u64,
}

impl WebDriverCompatibleCommand for WaitForCaptcha {
    fn endpoint(&self, base_url: &Url, session_id: Option<&str>) -> Result<Url, url::ParseError> {
        let session = session_id.unwrap_or_default();
        base_url.join(&format!("session/{}/goog/cdp/execute", session))
    }

    fn method_and_body(&self, _request_url: &Url) -> (http::Method, Option<String>) {
        let body = json!({
            "cmd": "Captcha.waitForSolve",
            "params": { "detectTimeout": self.detect_timeout_ms },
        });
        (http::Method::POST, Some(body.to_string()))
    }
}

/// Failures here mean the page had no captcha or the endpoint does not
/// support the command; neither stops the fetch.
async fn wait_for_captcha(client: &Client) {
    let cmd = WaitForCaptcha {
        detect_timeout_ms: CAPTCHA_DETECT_TIMEOUT_MS,
    };
    match client.issue_cmd(cmd).await {
        Ok(value) => {
            let status = captcha_status(&value).unwrap_or("unknown");
            tracing::info!("Captcha status: {}", status);
        }
        Err(e) => {
            tracing::info!("No captcha detected (or unsupported).");
            tracing::debug!("captcha command error: {}", e);
        }
    }
}

fn captcha_status(value: &Value) -> Option<&str> {
    value
        .get("status")
        .or_else(|| value.pointer("/value/status"))
        .and_then(Value::as_str)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn chrome_capabilities() -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": CHROME_ARGS,
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false,
        }),
    );
    caps
}

/// Map a WebDriver failure message onto the retry taxonomy.
fn classify_error(message: String) -> FetchError {
    let lower = message.to_lowercase();
    if message.contains(AUTH_REJECTED_NEEDLE) {
        FetchError::AuthRejected(message)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        FetchError::Timeout(message)
    } else {
        FetchError::Session(message)
    }
}
