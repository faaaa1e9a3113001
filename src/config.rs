// Runtime configuration, read from the environment (and `.env` via dotenv in
// main). Every value except the credentials has a working default.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::core::relevance::RankingWeights;
use crate::core::retry::RetryPolicy;
use crate::infra::ai::openai_client::DEFAULT_BASE_URL;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// How to obtain Google access tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum GoogleCredentials {
    AccessToken(String),
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    ServiceAccountFile(PathBuf),
    ServiceAccountJson(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub google: Option<GoogleCredentials>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub drive_page_size: u32,
    pub fetch_concurrency: usize,
    pub request_timeout: Duration,
    pub max_displayed_results: usize,
    /// Snippets handed to the LLM per answer.
    pub answer_context_items: usize,
    pub weights: RankingWeights,
    pub retry: RetryPolicy,
    pub display_timezone: Tz,
    pub test_documents_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = RankingWeights::default();
        let weights = RankingWeights {
            content: weight(&var, "RANK_WEIGHT_CONTENT", defaults.content)?,
            name: weight(&var, "RANK_WEIGHT_NAME", defaults.name)?,
            folder: weight(&var, "RANK_WEIGHT_FOLDER", defaults.folder)?,
            recency: weight(&var, "RANK_WEIGHT_RECENCY", defaults.recency)?,
        };

        let retry = RetryPolicy {
            max_attempts: at_least(&var, "RETRY_MAX_ATTEMPTS", RetryPolicy::default().max_attempts, 1)?,
            ..RetryPolicy::default()
        };

        Ok(Self {
            google: google_credentials(&var)?,
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            drive_page_size: at_least(&var, "DRIVE_PAGE_SIZE", 20, 1)?,
            fetch_concurrency: at_least(&var, "DRIVE_FETCH_CONCURRENCY", 5, 1)?,
            request_timeout: Duration::from_millis(at_least(&var, "SEARCH_TIMEOUT_MS", 30_000u64, 1)?),
            max_displayed_results: at_least(&var, "MAX_DISPLAYED_RESULTS", 5, 1)?,
            answer_context_items: at_least(&var, "ANSWER_CONTEXT_ITEMS", 5, 1)?,
            weights,
            retry,
            display_timezone: parsed(&var, "DISPLAY_TIMEZONE", Tz::UTC)?,
            test_documents_dir: var("TEST_DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("evaluation/test_documents")),
        })
    }
}

fn google_credentials<V>(var: &V) -> Result<Option<GoogleCredentials>, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    if let Some(token) = var("GOOGLE_ACCESS_TOKEN") {
        return Ok(Some(GoogleCredentials::AccessToken(token)));
    }

    let client_id = var("GOOGLE_CLIENT_ID");
    let client_secret = var("GOOGLE_CLIENT_SECRET");
    let refresh_token = var("GOOGLE_REFRESH_TOKEN");
    if client_id.is_some() || client_secret.is_some() || refresh_token.is_some() {
        return Ok(Some(GoogleCredentials::RefreshToken {
            client_id: client_id.ok_or(ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            client_secret: client_secret.ok_or(ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            refresh_token: refresh_token.ok_or(ConfigError::Missing("GOOGLE_REFRESH_TOKEN"))?,
        }));
    }

    if let Some(path) = var("GOOGLE_SERVICE_ACCOUNT_KEY") {
        return Ok(Some(GoogleCredentials::ServiceAccountFile(PathBuf::from(path))));
    }
    if let Some(json) = var("GOOGLE_SERVICE_ACCOUNT_JSON") {
        return Ok(Some(GoogleCredentials::ServiceAccountJson(json)));
    }

    Ok(None)
}

fn parsed<V, T>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    V: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn at_least<V, T>(var: &V, name: &'static str, default: T, min: T) -> Result<T, ConfigError>
where
    V: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display + Copy,
    T::Err: Display,
{
    let value = parsed(var, name, default)?;
    if value < min {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: format!("must be at least {}", min),
        });
    }
    Ok(value)
}

fn weight<V>(var: &V, name: &'static str, default: f64) -> Result<f64, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    let value: f64 = parsed(var, name, default)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be a finite, non-negative number".to_string(),
        });
    }
    Ok(value)
}
