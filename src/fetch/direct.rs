use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

use super::{FetchError, PageSource};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Plain GET without JavaScript or captcha handling. Accepts whatever markup
/// a 2xx response carries.
pub struct HttpFallback {
    client: reqwest::Client,
}

impl HttpFallback {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFallback {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!("Fallback scraper (HTTP) activated.");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Request(format!("TimeoutError: {}", e))
            } else if e.is_connect() {
                FetchError::Request(format!("ConnectError: {}", e))
            } else {
                FetchError::Request(format!("RequestError: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_with_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>short is fine</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let fallback = HttpFallback::new().unwrap();
        let html = fallback
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(html, "<p>short is fine</p>");
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fallback = HttpFallback::new().unwrap();
        let err = fallback.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Upstream(404)));
    }

    #[tokio::test]
    async fn connection_failure_is_a_request_error() {
        let fallback = HttpFallback::new().unwrap();
        let err = fallback.fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
