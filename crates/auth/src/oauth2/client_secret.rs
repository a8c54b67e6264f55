//! Expiry extraction from JWT-shaped client secrets
//!
//! Providers such as Apple require the OAuth2 client secret to be a signed JWT
//! whose `exp` claim caps its lifetime. Only the payload segment is read here;
//! the signature is never checked because the secret is ours, not a credential
//! presented to us.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClaimDecodeError {
    #[error("client secret has no payload segment")]
    MissingPayload,

    #[error("payload is not valid base64url: {0}")]
    Base64(String),

    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("payload has no numeric exp claim")]
    MissingExpiry,

    #[error("exp claim {0} is out of range")]
    ExpiryOutOfRange(i64),
}

/// Registered claims of a client secret payload
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSecretClaims {
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    /// Team id for Apple secrets
    pub issuer: Option<String>,
    /// Client id for Apple secrets
    pub subject: Option<String>,
    /// Empty when the payload carries no `aud`
    pub audience: Vec<String>,
}

/// When a client secret stops being accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryClaim {
    expires_at: DateTime<Utc>,
}

impl ExpiryClaim {
    pub fn timestamp(&self) -> i64 {
        self.expires_at.timestamp()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Calendar day of the expiry as seen from `offset`
    pub fn date_in(&self, offset: &FixedOffset) -> NaiveDate {
        self.expires_at.with_timezone(offset).date_naive()
    }
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    exp: Option<serde_json::Number>,
    iat: Option<serde_json::Number>,
    iss: Option<String>,
    sub: Option<String>,
    aud: Option<Audience>,
}

/// `aud` may be a single string or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl From<Audience> for Vec<String> {
    fn from(aud: Audience) -> Self {
        match aud {
            Audience::One(single) => vec![single],
            Audience::Many(list) => list,
        }
    }
}

/// Decode the payload segment of a dot-delimited client secret
pub fn decode_claims(client_secret: &str) -> Result<ClientSecretClaims, ClaimDecodeError> {
    let payload = client_secret
        .trim()
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or(ClaimDecodeError::MissingPayload)?;

    // Some tools emit padded segments; the JWT form is unpadded.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClaimDecodeError::Base64(e.to_string()))?;

    let raw: RawClaims =
        serde_json::from_slice(&bytes).map_err(|e| ClaimDecodeError::Json(e.to_string()))?;

    let exp = raw
        .exp
        .as_ref()
        .and_then(number_to_seconds)
        .ok_or(ClaimDecodeError::MissingExpiry)?;
    let expires_at = DateTime::from_timestamp(exp, 0).ok_or(ClaimDecodeError::ExpiryOutOfRange(exp))?;

    let issued_at = raw
        .iat
        .as_ref()
        .and_then(number_to_seconds)
        .and_then(|iat| DateTime::from_timestamp(iat, 0));

    Ok(ClientSecretClaims {
        expires_at,
        issued_at,
        issuer: raw.iss,
        subject: raw.sub,
        audience: raw.aud.map(Vec::from).unwrap_or_default(),
    })
}

/// Decode only the expiry of a client secret
pub fn decode_expiry(client_secret: &str) -> Result<ExpiryClaim, ClaimDecodeError> {
    decode_claims(client_secret).map(|claims| ExpiryClaim {
        expires_at: claims.expires_at,
    })
}

fn number_to_seconds(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))
}
