pub mod providers;
pub mod templates;

pub use providers::{ConsoleTransport, SendGridTransport, SENDGRID_DEFAULT_ENDPOINT};
pub use templates::{EmailTemplate, TemplateEngine};

use async_trait::async_trait;
use learnhub_core::{ConfigLoader, LearnHubError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, EmailError>;

/// Name and address of one side of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

impl Mailbox {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// A fully rendered message ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: Mailbox,
    pub from: Mailbox,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Direct transactional email delivery
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmailProviderConfig {
    SendGrid { api_key: String, endpoint: String },
    Console,
}

/// Mail transport selection
///
/// # Environment Variables
///
/// - `LEARNHUB_EMAIL_PROVIDER` (optional): `console` or `sendgrid` (default: "console")
/// - `SENDGRID_API_KEY` (required for sendgrid)
/// - `LEARNHUB_SENDGRID_ENDPOINT` (optional): Override of the v3 mail/send URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub provider: EmailProviderConfig,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProviderConfig::Console,
        }
    }
}

impl EmailConfig {
    pub fn build_transport(&self) -> Arc<dyn MailTransport> {
        match &self.provider {
            EmailProviderConfig::SendGrid { api_key, endpoint } => Arc::new(
                SendGridTransport::new(api_key.clone()).with_endpoint(endpoint.clone()),
            ),
            EmailProviderConfig::Console => Arc::new(ConsoleTransport),
        }
    }
}

impl ConfigLoader for EmailConfig {
    fn from_env() -> std::result::Result<Self, LearnHubError> {
        let provider = std::env::var("LEARNHUB_EMAIL_PROVIDER")
            .unwrap_or_else(|_| "console".to_string())
            .to_ascii_lowercase();

        let provider = match provider.as_str() {
            "console" => EmailProviderConfig::Console,
            "sendgrid" => EmailProviderConfig::SendGrid {
                api_key: std::env::var("SENDGRID_API_KEY").map_err(|_| {
                    LearnHubError::ConfigurationError {
                        message: "SENDGRID_API_KEY must be set for the sendgrid provider"
                            .to_string(),
                        key: Some("SENDGRID_API_KEY".to_string()),
                    }
                })?,
                endpoint: std::env::var("LEARNHUB_SENDGRID_ENDPOINT")
                    .unwrap_or_else(|_| SENDGRID_DEFAULT_ENDPOINT.to_string()),
            },
            other => {
                return Err(LearnHubError::ConfigurationError {
                    message: format!("Unknown email provider '{}'", other),
                    key: Some("LEARNHUB_EMAIL_PROVIDER".to_string()),
                })
            }
        };

        Ok(Self { provider })
    }

    fn validate(&self) -> std::result::Result<(), LearnHubError> {
        if let EmailProviderConfig::SendGrid { api_key, endpoint } = &self.provider {
            if api_key.trim().is_empty() {
                return Err(LearnHubError::ConfigurationError {
                    message: "SENDGRID_API_KEY must not be empty".to_string(),
                    key: Some("SENDGRID_API_KEY".to_string()),
                });
            }
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(LearnHubError::ConfigurationError {
                    message: format!("Invalid SendGrid endpoint '{}'", endpoint),
                    key: Some("LEARNHUB_SENDGRID_ENDPOINT".to_string()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_console() {
        let config = EmailConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.build_transport().name(), "console");
    }

    #[test]
    fn test_sendgrid_requires_key() {
        let config = EmailConfig {
            provider: EmailProviderConfig::SendGrid {
                api_key: " ".to_string(),
                endpoint: SENDGRID_DEFAULT_ENDPOINT.to_string(),
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_config_serde_tag() {
        let config: EmailProviderConfig = serde_json::from_str(
            r#"{"type":"SendGrid","api_key":"k","endpoint":"https://api.sendgrid.com/v3/mail/send"}"#,
        )
        .unwrap();
        assert!(matches!(config, EmailProviderConfig::SendGrid { .. }));
    }
}
