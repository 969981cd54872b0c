//! OAuth2 access tokens for Google APIs.
//!
//! A static token is used as it is. A service account key is exchanged with a signed RS256
//! assertion and the token is cached until shortly before it expires.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::info;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use invoice_corelib::err::ErrResp;

/// Service account key file content.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// The access token provider.
pub enum TokenSource {
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        cache: Mutex<Option<CachedToken>>,
    },
}

/// A token with its expiration time in UNIX seconds.
#[derive(Clone)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResBody {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

pub const SCOPE: &'static str = "https://www.googleapis.com/auth/cloud-platform";
const DEF_TOKEN_URI: &'static str = "https://oauth2.googleapis.com/token";
const GRANT_TYPE: &'static str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: i64 = 3600;
/// Refresh the cached token this many seconds before it expires.
const EXPIRY_MARGIN: i64 = 60;

impl TokenSource {
    /// To create a token source with a service account key (JSON) content.
    pub fn from_key_json(content: &str) -> Result<Self, String> {
        let key: ServiceAccountKey = match serde_json::from_str(content) {
            Err(e) => return Err(format!("parse service account key error: {}", e)),
            Ok(key) => key,
        };
        Ok(TokenSource::ServiceAccount {
            key,
            cache: Mutex::new(None),
        })
    }

    /// To get a valid access token.
    pub async fn token(&self, client: &Client) -> Result<String, ErrResp> {
        let (key, cache) = match self {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount { key, cache } => (key, cache),
        };

        let mut cache = cache.lock().await;
        let now = Utc::now().timestamp();
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at - EXPIRY_MARGIN > now {
                return Ok(cached.token.clone());
            }
        }

        let assertion = sign_assertion(key, now)?;
        let req = match client
            .post(key.token_uri.as_str())
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .build()
        {
            Err(e) => {
                let e = format!("generate token request error: {}", e);
                return Err(ErrResp::ErrRsc(Some(e)));
            }
            Ok(req) => req,
        };
        let resp = match client.execute(req).await {
            Err(e) => {
                let e = format!("execute token request error: {}", e);
                return Err(ErrResp::ErrIntMsg(Some(e)));
            }
            Ok(resp) => resp,
        };
        if resp.status() != StatusCode::OK {
            let e = format!("execute token request with status: {}", resp.status());
            return Err(ErrResp::ErrIntMsg(Some(e)));
        }
        let body = match resp.json::<TokenResBody>().await {
            Err(e) => {
                let e = format!("read token response error: {}", e);
                return Err(ErrResp::ErrIntMsg(Some(e)));
            }
            Ok(body) => body,
        };
        info!("access token refreshed for {}", key.client_email);
        *cache = Some(CachedToken {
            token: body.access_token.clone(),
            expires_at: now + body.expires_in,
        });
        Ok(body.access_token)
    }
}

/// To sign the JWT bearer assertion of the service account.
pub fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, ErrResp> {
    let encoding_key = match EncodingKey::from_rsa_pem(key.private_key.as_bytes()) {
        Err(e) => {
            let e = format!("invalid service account private key: {}", e);
            return Err(ErrResp::ErrRsc(Some(e)));
        }
        Ok(encoding_key) => encoding_key,
    };
    let claims = AssertionClaims {
        iss: key.client_email.as_str(),
        scope: SCOPE,
        aud: key.token_uri.as_str(),
        iat: now,
        exp: now + ASSERTION_LIFETIME,
    };
    match encode(&Header::new(Algorithm::RS256), &claims, &encoding_key) {
        Err(e) => {
            let e = format!("sign assertion error: {}", e);
            Err(ErrResp::ErrRsc(Some(e)))
        }
        Ok(assertion) => Ok(assertion),
    }
}

fn default_token_uri() -> String {
    DEF_TOKEN_URI.to_string()
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME
}
