//! Reminder for OAuth2 client secrets that expire today
//!
//! Providers such as Apple only accept client secrets minted as short-lived
//! JWTs. Once one expires, nobody can log in through that issuer until an
//! admin pastes in a new secret, so the day it expires the configured
//! reminder list (or, failing that, every site admin) gets an email.
//!
//! A run never fails as a whole: undecodable secrets, unresolvable users and
//! failed sends are logged and recorded in the [`RunReport`].

use super::dispatch::NotificationDispatcher;
use super::report::{DispatchOutcome, RunReport, SkippedSource};
use super::ScheduledTask;
use crate::email::{Mailbox, MailTransport, TemplateEngine};
use crate::error::{AuthError, Result};
use crate::i18n::{Localizer, StringParams};
use crate::oauth2::{decode_expiry, Issuer, IssuerRegistry};
use crate::settings::{self, ConfigStore, WatchConfig};
use crate::user::{Recipient, UserDirectory};
use async_trait::async_trait;
use chrono::NaiveDate;
use learnhub_core::SiteConfig;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Admin page listing configured issuers
pub const ISSUERS_PAGE: &str = "/admin/tool/oauth2/issuers.php";

/// What a reminder says about the expiring issuer
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationContext {
    pub issuer_id: i64,
    pub issuer_name: String,
    pub manage_url: String,
}

impl NotificationContext {
    pub fn for_issuer(issuer: &Issuer, site: &SiteConfig) -> Self {
        Self {
            issuer_id: issuer.id,
            issuer_name: issuer.name.clone(),
            manage_url: site.url(ISSUERS_PAGE),
        }
    }

    /// Edit form of this issuer
    pub fn edit_url(&self) -> String {
        format!("{}?id={}&action=edit", self.manage_url, self.issuer_id)
    }
}

enum Resolved {
    Recipient(Recipient),
    /// Override address whose lookup failed; still counts as an attempt
    Unresolved { email: String, reason: String },
}

pub struct ExpiryReminderTask {
    registry: Arc<dyn IssuerRegistry>,
    config_store: Arc<dyn ConfigStore>,
    directory: Arc<dyn UserDirectory>,
    localizer: Arc<dyn Localizer>,
    dispatcher: NotificationDispatcher,
    site: SiteConfig,
    watch: WatchConfig,
}

impl ExpiryReminderTask {
    pub fn new(
        registry: Arc<dyn IssuerRegistry>,
        config_store: Arc<dyn ConfigStore>,
        directory: Arc<dyn UserDirectory>,
        transport: Arc<dyn MailTransport>,
        localizer: Arc<dyn Localizer>,
        site: SiteConfig,
        watch: WatchConfig,
    ) -> Self {
        let dispatcher = NotificationDispatcher::new(
            transport,
            TemplateEngine::new(site.site_name.clone(), localizer.clone()),
            site.default_lang.clone(),
            watch.call_timeout,
        );

        Self {
            registry,
            config_store,
            directory,
            localizer,
            dispatcher,
            site,
            watch,
        }
    }

    /// Check every watched issuer against `today` and notify about those expiring
    pub async fn run(&self, today: NaiveDate) -> RunReport {
        let mut report = RunReport::default();

        let issuers = match self
            .bounded("issuer listing", self.registry.list_issuers(true))
            .await
        {
            Ok(issuers) => issuers,
            Err(e) => {
                error!(error = %e, "Could not list OAuth2 issuers");
                return report;
            }
        };

        let sender = Mailbox::new(
            self.site.support_email.clone(),
            self.site.support_name.clone(),
        );
        let timezone = self.site.timezone();

        for issuer in issuers
            .iter()
            .filter(|issuer| issuer.is_watched(&self.watch.service_types))
        {
            report.sources_checked += 1;

            let claim = match decode_expiry(&issuer.client_secret) {
                Ok(claim) => claim,
                Err(e) => {
                    warn!(
                        issuer_id = issuer.id,
                        issuer = %issuer.name,
                        error = %e,
                        "Skipping issuer with unreadable client secret"
                    );
                    report.skip(SkippedSource {
                        issuer_id: issuer.id,
                        issuer_name: issuer.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let expiry_date = claim.date_in(&timezone);
            if expiry_date != today {
                debug!(
                    issuer_id = issuer.id,
                    expires = %expiry_date,
                    "Client secret does not expire today"
                );
                continue;
            }

            info!(
                issuer_id = issuer.id,
                issuer = %issuer.name,
                expires_at = %claim.expires_at(),
                "Client secret expires today"
            );
            report.expiring_sources.push(issuer.id);

            let context = NotificationContext::for_issuer(issuer, &self.site);
            for resolved in self.resolve_recipients(issuer.id).await {
                let outcome = match resolved {
                    Resolved::Recipient(recipient) => {
                        let status = self.dispatcher.send(&recipient, &context, &sender).await;
                        DispatchOutcome::for_recipient(issuer.id, &recipient, status)
                    }
                    Resolved::Unresolved { email, reason } => {
                        warn!(issuer_id = issuer.id, recipient = %email, reason = %reason, "Reminder not sent");
                        DispatchOutcome::unresolved(issuer.id, &email, reason)
                    }
                };
                report.record(outcome);
            }
        }

        report
    }

    /// Reminder list if configured, site admins otherwise
    ///
    /// Each address or admin id is notified at most once per issuer.
    async fn resolve_recipients(&self, issuer_id: i64) -> Vec<Resolved> {
        let overrides = match self
            .setting(settings::AUTH_OAUTH2, settings::REMINDER_EMAILS)
            .await
        {
            Ok(value) => settings::split_list(&value),
            Err(e) => {
                error!(issuer_id, error = %e, "Could not read reminder recipients");
                return Vec::new();
            }
        };

        if !overrides.is_empty() {
            let mut resolved = Vec::with_capacity(overrides.len());
            let mut seen = HashSet::new();
            for email in overrides {
                if !seen.insert(email.to_lowercase()) {
                    debug!(recipient = %email, "Duplicate reminder address");
                    continue;
                }
                match self
                    .bounded("user lookup", self.directory.find_by_email(&email))
                    .await
                {
                    Ok(Some(recipient)) => resolved.push(Resolved::Recipient(recipient)),
                    Ok(None) => {
                        debug!(recipient = %email, "No account for reminder address, using placeholder");
                        resolved.push(Resolved::Recipient(Recipient::placeholder(
                            &email,
                            &self.noreply_name(),
                        )));
                    }
                    Err(e) => resolved.push(Resolved::Unresolved {
                        email,
                        reason: e.to_string(),
                    }),
                }
            }
            return resolved;
        }

        let admin_ids = match self.setting(settings::CORE, settings::SITE_ADMINS).await {
            Ok(value) => settings::split_list(&value),
            Err(e) => {
                error!(issuer_id, error = %e, "Could not read site admins");
                return Vec::new();
            }
        };

        let mut resolved = Vec::with_capacity(admin_ids.len());
        let mut seen = HashSet::new();
        for raw_id in admin_ids {
            let Ok(id) = Uuid::parse_str(&raw_id) else {
                warn!(admin_id = %raw_id, "Ignoring malformed site admin id");
                continue;
            };
            if !seen.insert(id) {
                continue;
            }

            match self
                .bounded("user lookup", self.directory.find_by_id(id))
                .await
            {
                Ok(Some(recipient)) => resolved.push(Resolved::Recipient(recipient)),
                Ok(None) => warn!(admin_id = %id, "Site admin not found"),
                Err(e) => warn!(admin_id = %id, error = %e, "Site admin lookup failed"),
            }
        }

        if resolved.is_empty() {
            info!(issuer_id, "No reminder recipients configured");
        }
        resolved
    }

    /// A setting, with unset treated as empty
    async fn setting(&self, plugin: &str, name: &str) -> Result<String> {
        self.bounded("config read", self.config_store.get(plugin, name))
            .await
            .map(Option::unwrap_or_default)
    }

    fn noreply_name(&self) -> String {
        self.localizer
            .format("noreplyname", &StringParams::new(), &self.site.default_lang)
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.watch.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout {
                operation,
                seconds: self.watch.call_timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl ScheduledTask for ExpiryReminderTask {
    fn name(&self) -> String {
        self.localizer.format(
            "task_apple_expiry_reminder",
            &StringParams::new(),
            &self.site.default_lang,
        )
    }

    async fn execute(&self) -> Result<()> {
        let today = self.site.today();
        let report = self.run(today).await;

        info!(
            date = %today,
            sources_checked = report.sources_checked,
            expiring = report.expiring_sources.len(),
            skipped = report.skipped_sources().len(),
            sent = report.sent_count(),
            failed = report.failed_count(),
            "Expiry reminder run finished"
        );

        Ok(())
    }
}
