use super::{EmailError, MailTransport, OutgoingMail, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

pub const SENDGRID_DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridTransport {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl SendGridTransport {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: SENDGRID_DEFAULT_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn payload(mail: &OutgoingMail) -> serde_json::Value {
        json!({
            "personalizations": [{
                "to": [{"email": mail.to.email, "name": mail.to.name}],
                "subject": mail.subject
            }],
            "from": {
                "email": mail.from.email,
                "name": mail.from.name
            },
            "content": [
                {
                    "type": "text/plain",
                    "value": mail.text_body
                },
                {
                    "type": "text/html",
                    "value": mail.html_body
                }
            ]
        })
    }
}

#[async_trait]
impl MailTransport for SendGridTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if !mail.to.email.contains('@') {
            return Err(EmailError::InvalidAddress(mail.to.email.clone()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&Self::payload(mail))
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(EmailError::SendFailed(format!(
                "SendGrid API error ({}): {}",
                status, error_text
            )))
        }
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}

/// Writes messages to the log instead of delivering them
pub struct ConsoleTransport;

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        info!(
            to = %mail.to.email,
            from = %mail.from.email,
            subject = %mail.subject,
            body = %mail.text_body,
            "EMAIL SENT (console transport)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
