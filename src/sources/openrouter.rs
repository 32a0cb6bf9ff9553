use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{API_KEY_ENV, ExplanationConfig};
use crate::entities::explanation::ExplanationService;
use crate::error::AdvisorError;

const OPENROUTER_API: &str = "OpenRouter";

pub struct OpenRouterClient {
    client: reqwest::Client,
    config: ExplanationConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenRouterClient {
    pub fn new(config: ExplanationConfig) -> Result<Self, AdvisorError> {
        Ok(Self {
            client: crate::sources::http_client(config.timeout)?,
            config,
        })
    }

    pub fn config(&self) -> &ExplanationConfig {
        &self.config
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, AdvisorError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AdvisorError::MissingCredential {
                env_var: API_KEY_ENV,
            })?;

        let url = self.config.endpoint("chat/completions");
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
        };

        debug!(url = %url, model = %self.config.model, "POST chat completion");
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| AdvisorError::from_transport(err, self.config.timeout))?;

        let status = resp.status();
        let payload =
            crate::sources::read_limited_body(resp, OPENROUTER_API, self.config.timeout).await?;
        if !status.is_success() {
            return Err(AdvisorError::Api {
                api: OPENROUTER_API.to_string(),
                message: format!(
                    "API Error: {}\n{}",
                    status.as_u16(),
                    crate::sources::body_excerpt(&payload)
                ),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_slice(&payload).map_err(|source| AdvisorError::Api {
                api: OPENROUTER_API.to_string(),
                message: format!(
                    "Invalid JSON response: {} ({source})",
                    crate::sources::body_excerpt(&payload)
                ),
            })?;
        first_message_content(parsed).ok_or_else(|| AdvisorError::Api {
            api: OPENROUTER_API.to_string(),
            message: "Response contained no message content".into(),
        })
    }
}

fn first_message_content(resp: ChatCompletionResponse) -> Option<String> {
    resp.choices
        .into_iter()
        .next()?
        .message?
        .content
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl ExplanationService for OpenRouterClient {
    async fn explain(&self, prompt: &str) -> Result<String, AdvisorError> {
        self.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: String) -> ExplanationConfig {
        ExplanationConfig {
            base_url: base,
            api_key: Some("sk-test".into()),
            model: "test/model".into(),
            max_tokens: 300,
            timeout: Duration::from_millis(500),
        }
    }

    #[tokio::test]
    async fn complete_sends_chat_request_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "test/model",
                "max_tokens": 300,
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "  - Likely effective.\n"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(test_config(server.uri())).unwrap();
        let text = client.complete("hello").await.unwrap();
        assert_eq!(text, "- Likely effective.");
    }

    #[tokio::test]
    async fn complete_reports_status_and_body_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("{\"error\":\"invalid key\"}"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(test_config(server.uri())).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("API Error: 401"));
        assert!(message.contains("invalid key"));
    }

    #[tokio::test]
    async fn complete_times_out_without_retrying() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(test_config(server.uri())).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
    }

    #[tokio::test]
    async fn complete_rejects_response_without_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(test_config(server.uri())).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }

    #[tokio::test]
    async fn complete_rejects_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(test_config(server.uri())).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("Invalid JSON response"));
    }

    #[tokio::test]
    async fn missing_api_key_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = test_config(server.uri());
        config.api_key = None;
        let client = OpenRouterClient::new(config).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, AdvisorError::MissingCredential { .. }));
        assert!(err.to_string().contains(API_KEY_ENV));
    }
}
