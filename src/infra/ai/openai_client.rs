use crate::core::ai::{AiConfig, AiError, AiMessage, AiProvider, AiProviderResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: String, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn build_payload(messages: &[AiMessage], config: &AiConfig) -> Value {
    let mut payload = json!({
        "model": config.model,
        "messages": messages,
        "temperature": config.temperature,
    });

    // Optional knobs are left out entirely rather than sent as null.
    if let Some(max_tokens) = config.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    if let Some(presence_penalty) = config.presence_penalty {
        payload["presence_penalty"] = json!(presence_penalty);
    }
    if let Some(frequency_penalty) = config.frequency_penalty {
        payload["frequency_penalty"] = json!(frequency_penalty);
    }
    payload
}

fn parse_content(response: &Value) -> Result<String, AiError> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| AiError::Decode("missing choices[0].message.content".to_string()))?
        .trim();

    if content.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(content.to_string())
}

#[async_trait]
impl AiProvider for OpenAiClient {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, AiError> {
        let payload = build_payload(messages, config);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("Chat completion failed: {} - {}", status, text);
            return Err(AiError::Http {
                status: status.as_u16(),
                message: text,
            });
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| AiError::Decode(e.to_string()))?;

        Ok(AiProviderResponse {
            content: parse_content(&response_json)?,
        })
    }
}

/// Stand-in used when no API key is configured. Every call fails, which makes
/// question mode fall back to its plain summary.
pub struct UnconfiguredProvider;

#[async_trait]
impl AiProvider for UnconfiguredProvider {
    async fn chat_complete(
        &self,
        _messages: &[AiMessage],
        _config: &AiConfig,
    ) -> Result<AiProviderResponse, AiError> {
        Err(AiError::NotConfigured)
    }
}
