//! HS256 access tokens.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Access token claims.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Claims {
    /// The user ID.
    pub sub: String,
    pub username: String,
    /// Names of enabled roles.
    pub roles: Vec<String>,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token verification errors.
#[derive(Debug, PartialEq)]
pub enum Error {
    Expired,
    Invalid(String),
}

/// The token issuer and verifier.
#[derive(Clone)]
pub struct Jwt {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
}

impl Jwt {
    /// Create an instance with the HS256 secret and token lifetime in seconds.
    pub fn new(secret: &str, expires_in: u64) -> Self {
        Jwt {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in: expires_in as i64,
        }
    }

    /// To issue an access token for the user.
    pub fn issue(&self, user: &User, now: &DateTime<Utc>) -> Result<String, String> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user.user_id.clone(),
            username: user.username.clone(),
            roles: role_names(&user.roles),
            tenant_id: user.tenant_id.clone(),
            iat,
            exp: iat + self.expires_in,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| e.to_string())
    }

    /// To verify the access token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(Error::Expired),
                _ => Err(Error::Invalid(e.to_string())),
            },
            Ok(data) => Ok(data.claims),
        }
    }
}

/// Returns the sorted names of enabled roles.
pub fn role_names(roles: &HashMap<String, bool>) -> Vec<String> {
    let mut names: Vec<String> = roles
        .iter()
        .filter(|(_, enabled)| **enabled)
        .map(|(name, _)| name.clone())
        .collect();
    names.sort();
    names
}
