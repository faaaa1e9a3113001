// =============================================================================
// GOOGLE OAUTH ACCESS TOKENS
// =============================================================================
//
// Three ways to get a bearer token for the Drive and Docs APIs:
//
// 1. **Refresh token** (installed app): `GOOGLE_CLIENT_ID`,
//    `GOOGLE_CLIENT_SECRET` and `GOOGLE_REFRESH_TOKEN`. Acts as the user, so
//    every file the user can see is searchable.
// 2. **Service account**: `GOOGLE_SERVICE_ACCOUNT_KEY` (path to the JSON key)
//    or `GOOGLE_SERVICE_ACCOUNT_JSON` (the JSON itself). Only files shared with
//    the service account email are visible.
// 3. **Static token**: `GOOGLE_ACCESS_TOKEN`, e.g. from `gcloud auth
//    print-access-token`. Not refreshed.
//
// Tokens are cached in memory and refreshed a minute before they expire.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::http::{check_status, network_error};
use crate::core::retry::{retry, RetryPolicy};
use crate::core::search::DriveError;

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/drive.readonly https://www.googleapis.com/auth/documents.readonly";
const REFRESH_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// A bearer token valid for at least the next minute.
    async fn access_token(&self) -> Result<String, DriveError>;
}

#[async_trait]
impl AccessTokenProvider for Box<dyn AccessTokenProvider> {
    async fn access_token(&self) -> Result<String, DriveError> {
        (**self).access_token().await
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

#[derive(Default)]
struct TokenCache {
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    async fn valid_token(&self, now: SystemTime) -> Option<String> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|t| t.expires_at > now + REFRESH_MARGIN)
            .map(|t| t.token.clone())
    }

    async fn store(&self, response: TokenResponse, now: SystemTime) -> String {
        let lifetime = response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let mut cached = self.cached.write().await;
        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: now + Duration::from_secs(lifetime),
        });
        response.access_token
    }
}

/// POSTs a form to the token endpoint. Rejections (4xx other than 429) are
/// reported as auth failures so they are not retried.
async fn exchange(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, DriveError> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(network_error)?;

    let response = match check_status(response).await {
        Ok(response) => response,
        Err(DriveError::Http { status, message }) if (400..500).contains(&status) && status != 429 => {
            return Err(DriveError::Auth(format!(
                "token exchange rejected ({}): {}",
                status, message
            )))
        }
        Err(e) => return Err(e),
    };

    response.json().await.map_err(network_error)
}

// =============================================================================
// REFRESH TOKEN
// =============================================================================

pub struct RefreshTokenAuth {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    client: Client,
    cache: TokenCache,
    retry: RetryPolicy,
}

impl RefreshTokenAuth {
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            client: Client::new(),
            cache: TokenCache::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, DriveError> {
        exchange(
            &self.client,
            GOOGLE_TOKEN_URI,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ],
        )
        .await
    }
}

#[async_trait]
impl AccessTokenProvider for RefreshTokenAuth {
    async fn access_token(&self) -> Result<String, DriveError> {
        if let Some(token) = self.cache.valid_token(SystemTime::now()).await {
            return Ok(token);
        }

        let response = retry(&self.retry, "oauth_refresh", move || self.fetch_new_token()).await?;
        tracing::debug!("Refreshed OAuth access token");
        Ok(self.cache.store(response, SystemTime::now()).await)
    }
}

// =============================================================================
// SERVICE ACCOUNT
// =============================================================================

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// The service account email (used as issuer in JWT).
    client_email: String,

    /// The private key in PEM format.
    private_key: String,

    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    /// At most one hour after `iat`.
    exp: u64,
}

pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    client: Client,
    cache: TokenCache,
    retry: RetryPolicy,
}

impl ServiceAccountAuth {
    /// Creates a new authenticator from a JSON key file path.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DriveError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, DriveError> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)
            .map_err(|e| DriveError::Auth(format!("invalid service account key: {}", e)))?;
        Ok(Self {
            credentials,
            client: Client::new(),
            cache: TokenCache::default(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn signed_assertion(&self) -> Result<String, DriveError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DriveError::Auth(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + DEFAULT_TOKEN_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| DriveError::Auth(format!("invalid private key: {}", e)))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| DriveError::Auth(format!("could not sign assertion: {}", e)))
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, DriveError> {
        let jwt = self.signed_assertion()?;
        exchange(
            &self.client,
            &self.credentials.token_uri,
            &[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ],
        )
        .await
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, DriveError> {
        if let Some(token) = self.cache.valid_token(SystemTime::now()).await {
            return Ok(token);
        }

        let response = retry(&self.retry, "service_account_token", move || {
            self.fetch_new_token()
        }).await?;
        tracing::debug!(
            client_email = %self.credentials.client_email,
            "Fetched service account access token"
        );
        Ok(self.cache.store(response, SystemTime::now()).await)
    }
}

// =============================================================================
// STATIC TOKEN
// =============================================================================

pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenAuth {
    async fn access_token(&self) -> Result<String, DriveError> {
        Ok(self.token.clone())
    }
}
