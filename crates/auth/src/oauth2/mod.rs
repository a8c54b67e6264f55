pub mod client_secret;
pub mod registry;

pub use client_secret::{
    decode_claims, decode_expiry, ClaimDecodeError, ClientSecretClaims, ExpiryClaim,
};
pub use registry::{InMemoryIssuerRegistry, IssuerRegistry, PostgresIssuerRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity provider family an issuer was created from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Google,
    Microsoft,
    Facebook,
    Nextcloud,
    LinkedIn,
    Apple,
    /// Any issuer configured by hand
    Custom(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::Google => "google",
            ServiceType::Microsoft => "microsoft",
            ServiceType::Facebook => "facebook",
            ServiceType::Nextcloud => "nextcloud",
            ServiceType::LinkedIn => "linkedin",
            ServiceType::Apple => "apple",
            ServiceType::Custom(tag) => tag,
        }
    }
}

impl From<&str> for ServiceType {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "google" => ServiceType::Google,
            "microsoft" => ServiceType::Microsoft,
            "facebook" => ServiceType::Facebook,
            "nextcloud" => ServiceType::Nextcloud,
            "linkedin" => ServiceType::LinkedIn,
            "apple" => ServiceType::Apple,
            other => ServiceType::Custom(other.to_string()),
        }
    }
}

impl From<String> for ServiceType {
    fn from(tag: String) -> Self {
        ServiceType::from(tag.as_str())
    }
}

impl From<ServiceType> for String {
    fn from(service_type: ServiceType) -> Self {
        service_type.as_str().to_string()
    }
}

impl FromStr for ServiceType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ServiceType::from(s))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured OAuth2 identity provider used for federated login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    pub id: i64,
    pub name: String,
    pub enabled: bool,
    pub service_type: ServiceType,
    #[serde(skip_serializing)]
    pub client_secret: String,
}

impl Issuer {
    pub fn is_watched(&self, service_types: &[ServiceType]) -> bool {
        self.enabled && service_types.contains(&self.service_type)
    }
}
