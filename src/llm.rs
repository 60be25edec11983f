use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmSettings;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Configuration error: {0}")]
    Config(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt and return the model's text reply.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

// ── Together (OpenAI-compatible chat completions) ────────────────────────────

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TogetherClient {
    client: reqwest::Client,
    settings: LlmSettings,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl TogetherClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(settings.request_timeout))
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for TogetherClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Config("TOGETHER_API_KEY is not set".to_string()))?;

        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{}: {}", status, detail)));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::Api("response contained no choices".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String, api_key: Option<&str>) -> LlmSettings {
        LlmSettings {
            api_key: api_key.map(str::to_string),
            base_url,
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            temperature: 0.1,
            max_tokens: 512,
            request_timeout: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn sends_chat_request_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "mistralai/Mixtral-8x7B-Instruct-v0.1",
                "max_tokens": 512,
                "messages": [{"role": "user", "content": "say hi"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hi"}}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TogetherClient::new(settings(format!("{}/v1/", server.uri()), Some("test-key"))).unwrap();
        assert_eq!(client.complete("say hi").await.unwrap(), "hi");
        assert_eq!(client.model_name(), "mistralai/Mixtral-8x7B-Instruct-v0.1");
    }

    #[tokio::test]
    async fn rate_limit_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = TogetherClient::new(settings(server.uri(), Some("k"))).unwrap();
        assert!(matches!(client.complete("x").await, Err(LlmError::RateLimit)));
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = TogetherClient::new(settings(server.uri(), Some("bad"))).unwrap();
        match client.complete("x").await {
            Err(LlmError::Api(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid api key"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_are_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = TogetherClient::new(settings(server.uri(), Some("k"))).unwrap();
        assert!(matches!(client.complete("x").await, Err(LlmError::Api(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = TogetherClient::new(settings(server.uri(), None)).unwrap();
        assert!(matches!(client.complete("x").await, Err(LlmError::Config(_))));
    }

    #[tokio::test]
    async fn slow_responses_time_out_as_network_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut quick = settings(server.uri(), Some("k"));
        quick.request_timeout = Duration::from_millis(200);
        let client = TogetherClient::new(quick).unwrap();

        match client.complete("x").await {
            Err(LlmError::Network(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }
}
