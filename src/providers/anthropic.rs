/*!
 * Anthropic client for the translation service.
 *
 * Thin transport layer over the messages and balance endpoints. HTTP
 * statuses are classified into [`ProviderError`] variants here so the
 * orchestrator can decide retry eligibility without touching reqwest.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{Provider, TranslationRequest, TranslationResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// Anthropic messages API client
#[derive(Debug)]
pub struct AnthropicProvider {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Model identifier sent with every request
    model: String,
    /// Per-request timeout, also reported in timeout errors
    timeout_secs: u64,
}

/// Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
struct TokenUsage {
    input_tokens: u64,
    output_tokens: u64,
}

/// Messages API response body
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// Balance endpoint response body
#[derive(Debug, Deserialize)]
struct BalanceResponse {
    remaining_credit: f64,
}

impl AnthropicProvider {
    /// Create a new client. An empty endpoint falls back to the public API.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            timeout_secs,
        }
    }

    fn url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}{}", base, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout_secs)
        } else {
            ProviderError::Connection(e.to_string())
        }
    }

    /// Map a non-success HTTP status to the matching error class.
    async fn classify_status(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        error!("Anthropic API error ({}): {}", status, message);

        match status.as_u16() {
            401 | 403 => ProviderError::AuthFailed(message),
            429 => ProviderError::RateLimited(message),
            code if status.is_server_error() => ProviderError::ServerError {
                status: code,
                message,
            },
            code => ProviderError::MalformedRequest {
                status: code,
                message,
            },
        }
    }

    async fn complete(&self, request: MessagesRequest) -> Result<MessagesResponse, ProviderError> {
        let response = self
            .client
            .post(self.url("/v1/messages"))
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, ProviderError> {
        let body = MessagesRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.text,
            }],
            system: Some(request.system_prompt),
            temperature: Some(request.temperature),
            max_tokens: request.max_tokens,
        };

        let response = self.complete(body).await?;

        let text: String = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect();

        if let Some(usage) = &response.usage {
            debug!(
                "Anthropic call used {} input / {} output tokens",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(TranslationResponse {
            text,
            input_tokens: response.usage.as_ref().map(|u| u.input_tokens),
            output_tokens: response.usage.as_ref().map(|u| u.output_tokens),
        })
    }

    async fn remaining_credit(&self) -> Result<f64, ProviderError> {
        let response = self
            .client
            .get(self.url("/v1/balance"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }

        let balance = response
            .json::<BalanceResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(balance.remaining_credit)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = MessagesRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            system: None,
            temperature: None,
            max_tokens: 10,
        };

        self.complete(request).await?;
        Ok(())
    }
}
