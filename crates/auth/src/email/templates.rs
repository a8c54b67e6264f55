use crate::i18n::{Localizer, StringParams};
use crate::task::NotificationContext;
use crate::user::Recipient;
use std::sync::Arc;

pub struct EmailTemplate {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Renders notification mail from localized strings
pub struct TemplateEngine {
    site_name: String,
    localizer: Arc<dyn Localizer>,
}

impl TemplateEngine {
    pub fn new(site_name: String, localizer: Arc<dyn Localizer>) -> Self {
        Self {
            site_name,
            localizer,
        }
    }

    pub fn localizer(&self) -> &Arc<dyn Localizer> {
        &self.localizer
    }

    /// Parameters shared by every string of the expiry reminder
    pub fn reminder_params(
        &self,
        recipient: &Recipient,
        context: &NotificationContext,
    ) -> StringParams {
        let mut params = StringParams::new();
        params.insert("sitename".to_string(), self.site_name.clone());
        params.insert("tousername".to_string(), recipient.full_name());
        params.insert("clientname".to_string(), context.issuer_name.clone());
        params.insert("clientid".to_string(), context.issuer_id.to_string());
        params.insert("editlink".to_string(), context.edit_url());
        params.insert("managelink".to_string(), context.manage_url.clone());
        params
    }

    pub fn render_issuer_expiry(
        &self,
        recipient: &Recipient,
        context: &NotificationContext,
        locale: &str,
    ) -> EmailTemplate {
        let text_params = self.reminder_params(recipient, context);

        let subject = format!(
            "{}: {}",
            self.site_name,
            self.localizer
                .format("appleclientexpiredsubject", &text_params, locale)
        );

        let text_body = self
            .localizer
            .format("appleclientexpiredmessage", &text_params, locale);

        let mut html_params: StringParams = text_params
            .iter()
            .map(|(key, value)| (key.clone(), escape_html(value)))
            .collect();
        html_params.insert(
            "editlink".to_string(),
            format!(r#"<a href="{}">Here</a>"#, escape_html(&context.edit_url())),
        );
        html_params.insert(
            "managelink".to_string(),
            format!(
                r#"<a href="{0}">{0}</a>"#,
                escape_html(&context.manage_url)
            ),
        );

        let message = self
            .localizer
            .format("appleclientexpiredmessage", &html_params, locale)
            .replace('\n', "<br>\n");

        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{}</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333;">
    <div>
{}
    </div>
    <p style="color: #7f8c8d; font-size: 14px;">This is an automated message from {}, please do not reply.</p>
</body>
</html>"#,
            escape_html(&subject),
            message,
            escape_html(&self.site_name)
        );

        EmailTemplate {
            subject,
            html_body,
            text_body,
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::StringCatalog;

    fn context() -> NotificationContext {
        NotificationContext {
            issuer_id: 4,
            issuer_name: "Sign in <Apple>".to_string(),
            manage_url: "https://learn.example.edu/admin/tool/oauth2/issuers.php".to_string(),
        }
    }

    fn engine() -> TemplateEngine {
        TemplateEngine::new("Example Campus".to_string(), Arc::new(StringCatalog::new()))
    }

    #[test]
    fn test_subject_is_prefixed_with_site_name() {
        let recipient = Recipient::placeholder("ops@example.edu", "Do not reply to this email");
        let template = engine().render_issuer_expiry(&recipient, &context(), "en");

        assert_eq!(
            template.subject,
            "Example Campus: The client secret for Sign in <Apple> expires today"
        );
    }

    #[test]
    fn test_text_body_contains_plain_edit_url() {
        let recipient = Recipient::placeholder("ops@example.edu", "Do not reply to this email");
        let template = engine().render_issuer_expiry(&recipient, &context(), "en");

        assert!(template.text_body.starts_with("Hi Do not reply to this email,"));
        assert!(template
            .text_body
            .contains("https://learn.example.edu/admin/tool/oauth2/issuers.php?id=4&action=edit"));
        assert!(template.text_body.contains("(id 4)"));
    }

    #[test]
    fn test_html_body_links_and_escapes() {
        let recipient = Recipient::placeholder("ops@example.edu", "Do not reply to this email");
        let template = engine().render_issuer_expiry(&recipient, &context(), "en");

        assert!(template.html_body.contains(
            r#"<a href="https://learn.example.edu/admin/tool/oauth2/issuers.php?id=4&amp;action=edit">Here</a>"#
        ));
        assert!(template.html_body.contains("Sign in &lt;Apple&gt;"));
        assert!(!template.html_body.contains("Sign in <Apple>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
