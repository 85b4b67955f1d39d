use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, Response};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::retry::RetryPolicy;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ResponseFormat};
use crate::domain::models::ModelConfig;
use crate::domain::ports::{ChatClient, ChatError};

/// HTTP client for an OpenAI-compatible chat-completions endpoint
///
/// Each [`ChatClient::complete`] call is a fresh single-turn request; no
/// conversation history is kept between calls.
pub struct OpenAiChatClient {
    http_client: ReqwestClient,
    endpoint: String,
    model: String,
    temperature: Option<f32>,
    json_output: bool,
    retry_policy: RetryPolicy,
}

impl OpenAiChatClient {
    /// Build a client from the `model` configuration section
    pub fn new(config: &ModelConfig) -> Result<Self, ChatError> {
        // Never log the key itself
        let api_key_scrubbed = if config.api_key.len() > 8 {
            format!(
                "{}...[REDACTED]",
                config.api_key.chars().take(3).collect::<String>()
            )
        } else {
            "[REDACTED]".to_string()
        };
        info!(
            base_url = %config.base_url,
            model = %config.model,
            timeout_secs = config.timeout_secs,
            api_key = %api_key_scrubbed,
            "Initializing chat completion client"
        );

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ChatError::InvalidRequest(format!("Invalid API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()
            .map_err(|e| ChatError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            json_output: config.model_info.json_output,
            retry_policy: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        let mut request = ChatCompletionRequest::single_user_turn(&self.model, prompt);
        request.temperature = self.temperature;
        if self.json_output {
            request.response_format = Some(ResponseFormat::json_object());
        }
        request
    }

    async fn send_request(&self, request: &ChatCompletionRequest) -> Result<String, ChatError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatError::MalformedResponse("response has no message content".to_string()))
    }

    async fn handle_error_response(response: Response) -> ChatError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        warn!("API error ({}): {}", status, body);
        ChatError::from_status(status.as_u16(), body)
    }
}

fn classify_transport_error(err: reqwest::Error) -> ChatError {
    if err.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::NetworkError(err.to_string())
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let request = self.build_request(prompt);
        self.retry_policy
            .execute(|| self.send_request(&request))
            .await
    }
}
