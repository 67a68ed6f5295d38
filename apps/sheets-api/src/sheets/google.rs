//! Google Sheets REST client authenticated with a service-account key.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::sheets::service::SpreadsheetService;
use crate::sheets::ValueInputOption;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion (Google caps it at 1 hour).
const ASSERTION_TTL_SECS: i64 = 3600;

/// Refresh the access token this long before Google says it expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The subset of a service-account JSON key file we need.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            tracing::error!(?e, path = %path.display(), "cannot read credentials file");
            ApiError::internal(format!("Credentials file not readable: {}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            tracing::error!(?e, path = %path.display(), "cannot parse credentials file");
            ApiError::internal("Credentials file is not a service account key")
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: &'a [Vec<String>],
}

struct TokenCache {
    access_token: Option<String>,
    expires_at: Option<Instant>,
}

/// Spreadsheet client bound to one spreadsheet id.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    spreadsheet_id: String,
    http: reqwest::Client,
    key: Arc<ServiceAccountKey>,
    signer: EncodingKey,
    cache: Arc<RwLock<TokenCache>>,
}

impl GoogleSheetsClient {
    /// `insecure_tls` disables certificate verification; only meant for
    /// local development behind intercepting proxies.
    pub fn new(
        spreadsheet_id: &str,
        key: ServiceAccountKey,
        insecure_tls: bool,
    ) -> Result<Self, ApiError> {
        let signer = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;

        let mut builder = reqwest::Client::builder();
        if insecure_tls {
            tracing::warn!("TLS certificate verification disabled for spreadsheet client");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build()?;

        Ok(Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            http,
            key: Arc::new(key),
            signer,
            cache: Arc::new(RwLock::new(TokenCache {
                access_token: None,
                expires_at: None,
            })),
        })
    }

    pub fn from_credentials_file(
        spreadsheet_id: &str,
        path: &Path,
        insecure_tls: bool,
    ) -> Result<Self, ApiError> {
        Self::new(spreadsheet_id, ServiceAccountKey::from_file(path)?, insecure_tls)
    }

    /// Current access token, fetching a new one when missing or near expiry.
    async fn access_token(&self) -> Result<String, ApiError> {
        {
            let cache = self.cache.read().await;
            if let (Some(token), Some(expires_at)) = (&cache.access_token, cache.expires_at) {
                if Instant::now() + REFRESH_MARGIN < expires_at {
                    return Ok(token.clone());
                }
            }
        }

        let fresh = self.fetch_token().await?;
        let mut cache = self.cache.write().await;
        cache.access_token = Some(fresh.access_token.clone());
        cache.expires_at = Some(Instant::now() + Duration::from_secs(fresh.expires_in));
        Ok(fresh.access_token)
    }

    async fn fetch_token(&self) -> Result<TokenResponse, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let assertion = jsonwebtoken::encode(&header, &claims, &self.signer)?;

        tracing::info!(token_uri = %self.key.token_uri, "requesting spreadsheet access token");
        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let resp = ensure_success(resp, "token exchange").await?;
        Ok(resp.json().await?)
    }

    fn values_url(&self, range: &str) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(SHEETS_API_BASE)
            .map_err(|_| ApiError::internal("Invalid spreadsheet API base URL"))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::internal("Invalid spreadsheet API base URL"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }
}

/// Pass successful responses through; log and convert anything else.
async fn ensure_success(
    resp: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    tracing::error!(status = status.as_u16(), %detail, operation, "spreadsheet API call failed");
    Err(ApiError::internal(format!(
        "Spreadsheet {operation} failed ({status}): {detail}"
    )))
}

#[async_trait]
impl SpreadsheetService for GoogleSheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<Value>>, ApiError> {
        let token = self.access_token().await?;
        let url = self.values_url(range)?;
        tracing::debug!(%range, "reading spreadsheet range");

        let resp = self.http.get(url).bearer_auth(token).send().await?;
        let body: ValueRange = ensure_success(resp, "read").await?.json().await?;
        Ok(body.values)
    }

    async fn append_values(
        &self,
        range: &str,
        rows: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<(), ApiError> {
        let token = self.access_token().await?;
        let url = self.values_url(&format!("{range}:append"))?;
        tracing::info!(%range, rows = rows.len(), input = input.as_str(), "appending spreadsheet rows");

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", input.as_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&AppendBody { values: rows })
            .send()
            .await?;
        ensure_success(resp, "append").await?;
        Ok(())
    }
}
