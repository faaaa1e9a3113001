use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::retry::Retryable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMessage {
    pub role: String,
    pub content: String,
}

impl AiMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with every chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            max_tokens: Some(500),
            presence_penalty: Some(0.6),
            frequency_penalty: Some(0.3),
        }
    }
}

/// Response from an AI provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiProviderResponse {
    /// The main response content from the model.
    pub content: String,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no AI provider is configured (set OPENAI_API_KEY)")]
    NotConfigured,

    #[error("AI provider returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request to AI provider failed: {0}")]
    Network(String),

    #[error("could not decode AI provider response: {0}")]
    Decode(String),

    #[error("AI provider returned an empty response")]
    EmptyResponse,
}

impl Retryable for AiError {
    fn is_retryable(&self) -> bool {
        match self {
            AiError::Http { status, .. } => *status == 429 || *status >= 500,
            AiError::Network(_) => true,
            _ => false,
        }
    }
}
