//! Authentication for the Google Drive API.
//!
//! Three credential sources are supported: an installed-app client secrets
//! file (interactive consent on first use), a service account key (JWT
//! assertion, optionally impersonating a user) and a pre-issued access token.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::{OnceCell, RwLock};
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::error::{DriveError, Result};
use crate::models::{
    CredentialsFile, OAuthClientSecrets, ServiceAccountCredentials, TokenResponse,
};

/// Google OAuth2 token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google Drive API scope.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// How long to wait for the operator to finish browser consent.
const CONSENT_TIMEOUT: Duration = Duration::from_secs(300);

/// JWT claims for service account authentication.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,   // Issuer (service account email)
    scope: String, // OAuth scope
    aud: String,   // Audience (token endpoint)
    exp: u64,      // Expiration time
    iat: u64,      // Issued at
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>, // Impersonated user
}

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

/// Installed-app client; the flow is built on first use and keeps its own tokens.
struct InstalledApp {
    secret: ApplicationSecret,
    flow: OnceCell<DefaultAuthenticator>,
}

enum TokenSource {
    ServiceAccount(ServiceAccountCredentials),
    InstalledApp(InstalledApp),
    Static(String),
}

/// Authenticator for Google APIs.
#[derive(Clone)]
pub struct Authenticator {
    source: Arc<TokenSource>,
    subject: Option<String>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create an authenticator from a service account key or a client secrets file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let source = match serde_json::from_str::<CredentialsFile>(&content)? {
            CredentialsFile::ServiceAccount(credentials) => TokenSource::ServiceAccount(credentials),
            CredentialsFile::ClientSecrets(file) => {
                let secrets = file.installed.or(file.web).ok_or_else(|| {
                    DriveError::AuthenticationError(
                        "client secrets file has no \"installed\" or \"web\" section".to_string(),
                    )
                })?;
                TokenSource::InstalledApp(InstalledApp {
                    secret: application_secret(secrets),
                    flow: OnceCell::new(),
                })
            }
        };
        Ok(Self::with_source(source))
    }

    /// Create an authenticator around an already issued access token.
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self::with_source(TokenSource::Static(token.into()))
    }

    fn with_source(source: TokenSource) -> Self {
        Self {
            source: Arc::new(source),
            subject: None,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Act on behalf of `subject` (service accounts with domain-wide delegation only).
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        if !matches!(*self.source, TokenSource::ServiceAccount(_)) {
            tracing::warn!("Ignoring impersonation subject: only service accounts can impersonate");
            return self;
        }
        self.subject = Some(subject.into());
        self
    }

    /// Obtain the first access token, running interactive consent if needed.
    pub async fn authenticate(&self) -> Result<()> {
        self.get_access_token().await.map(|_| ())
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        let credentials = match self.source.as_ref() {
            TokenSource::ServiceAccount(credentials) => credentials,
            TokenSource::InstalledApp(app) => return installed_app_token(app).await,
            TokenSource::Static(token) => return Ok(token.clone()),
        };

        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                // Add 60 second buffer before expiration
                let buffer = Duration::from_secs(60);
                if token.expires_at > SystemTime::now() + buffer {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let response = self.assert_jwt(credentials).await?;
        let new_token = CachedToken {
            access_token: response.access_token,
            expires_at: SystemTime::now() + Duration::from_secs(response.expires_in),
        };

        // Cache the new token
        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    /// Exchange a signed JWT assertion for an access token.
    async fn assert_jwt(&self, credentials: &ServiceAccountCredentials) -> Result<TokenResponse> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DriveError::AuthenticationError(e.to_string()))?
            .as_secs();
        let token_uri = credentials.token_uri.as_deref().unwrap_or(TOKEN_URI);

        let claims = Claims {
            iss: credentials.client_email.clone(),
            scope: DRIVE_SCOPE.to_string(),
            aud: token_uri.to_string(),
            iat: now,
            exp: now + 3600, // 1 hour
            sub: self.subject.clone(),
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
        let jwt = encode(&header, &claims, &key)?;

        tracing::info!(account = %credentials.client_email, "Requesting service account token");
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];
        let response = self.client.post(token_uri).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenRefreshError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

/// Run the loopback consent flow once, then let it refresh its own tokens.
async fn installed_app_token(app: &InstalledApp) -> Result<String> {
    let flow = app
        .flow
        .get_or_try_init(|| async {
            InstalledFlowAuthenticator::builder(
                app.secret.clone(),
                InstalledFlowReturnMethod::HTTPRedirect,
            )
            .build()
            .await
        })
        .await?;

    let token = tokio::time::timeout(CONSENT_TIMEOUT, flow.token(&[DRIVE_SCOPE]))
        .await
        .map_err(|_| {
            DriveError::AuthenticationError("timed out waiting for browser consent".to_string())
        })??;

    token
        .token()
        .map(str::to_string)
        .ok_or_else(|| DriveError::AuthenticationError("no access token was issued".to_string()))
}

fn application_secret(secrets: OAuthClientSecrets) -> ApplicationSecret {
    ApplicationSecret {
        client_id: secrets.client_id,
        client_secret: secrets.client_secret,
        auth_uri: secrets.auth_uri,
        token_uri: secrets.token_uri,
        ..Default::default()
    }
}
