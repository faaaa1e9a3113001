pub mod ai_service;
pub mod models;

pub use ai_service::{AiProvider, AiService, DEFAULT_SYSTEM_PROMPT};
pub use models::{AiConfig, AiError, AiMessage, AiProviderResponse};
