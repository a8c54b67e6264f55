use super::expiry_reminder::NotificationContext;
use super::report::DispatchStatus;
use crate::email::{Mailbox, MailTransport, OutgoingMail, TemplateEngine};
use crate::user::Recipient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Sends reminder mail straight through the transport
///
/// Bypasses any in-app notification routing so the reminder always arrives
/// out of band. Failures are reported, never raised.
pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
    templates: TemplateEngine,
    default_locale: String,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        templates: TemplateEngine,
        default_locale: String,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            templates,
            default_locale,
            timeout,
        }
    }

    fn locale_for<'a>(&'a self, recipient: &'a Recipient) -> &'a str {
        recipient
            .locale
            .as_deref()
            .unwrap_or(self.default_locale.as_str())
    }

    pub async fn send(
        &self,
        recipient: &Recipient,
        context: &NotificationContext,
        sender: &Mailbox,
    ) -> DispatchStatus {
        let locale = self.locale_for(recipient);
        let template = self
            .templates
            .render_issuer_expiry(recipient, context, locale);

        let mail = OutgoingMail {
            to: Mailbox::new(recipient.email.clone(), recipient.full_name()),
            from: sender.clone(),
            subject: template.subject,
            text_body: template.text_body,
            html_body: template.html_body,
        };

        let status = match tokio::time::timeout(self.timeout, self.transport.send(&mail)).await {
            Ok(Ok(())) => DispatchStatus::Sent,
            Ok(Err(e)) => DispatchStatus::Failed(e.to_string()),
            Err(_) => DispatchStatus::Failed(format!(
                "{} transport timed out after {}s",
                self.transport.name(),
                self.timeout.as_secs()
            )),
        };

        let params = self.templates.reminder_params(recipient, context);
        let localizer = self.templates.localizer();
        match &status {
            DispatchStatus::Sent => info!(
                issuer_id = context.issuer_id,
                recipient = %recipient.email,
                synthetic = recipient.is_synthetic(),
                locale,
                "{}",
                localizer.format("emailsuccessnotice", &params, &self.default_locale)
            ),
            DispatchStatus::Failed(reason) => warn!(
                issuer_id = context.issuer_id,
                recipient = %recipient.email,
                synthetic = recipient.is_synthetic(),
                reason = %reason,
                "{}",
                localizer.format("emailfailednotice", &params, &self.default_locale)
            ),
        }

        status
    }
}
