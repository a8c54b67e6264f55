use crate::user::Recipient;
use serde::Serialize;
use uuid::Uuid;

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DispatchStatus {
    Sent,
    Failed(String),
}

impl DispatchStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchStatus::Sent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub issuer_id: i64,
    pub recipient_email: String,
    pub recipient_id: Option<Uuid>,
    pub is_synthetic: bool,
    #[serde(flatten)]
    pub status: DispatchStatus,
}

impl DispatchOutcome {
    pub fn for_recipient(issuer_id: i64, recipient: &Recipient, status: DispatchStatus) -> Self {
        Self {
            issuer_id,
            recipient_email: recipient.email.clone(),
            recipient_id: recipient.id,
            is_synthetic: recipient.is_synthetic(),
            status,
        }
    }

    /// An address that could not be resolved in time to attempt delivery
    pub fn unresolved(issuer_id: i64, email: &str, reason: String) -> Self {
        Self {
            issuer_id,
            recipient_email: email.to_string(),
            recipient_id: None,
            is_synthetic: false,
            status: DispatchStatus::Failed(reason),
        }
    }
}

/// An issuer that was inspected but whose secret could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSource {
    pub issuer_id: i64,
    pub issuer_name: String,
    pub reason: String,
}

/// What a single run of the expiry watch did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Enabled issuers of a watched type whose secret was examined
    pub sources_checked: usize,
    /// Issuers found to expire on the run date
    pub expiring_sources: Vec<i64>,
    outcomes: Vec<DispatchOutcome>,
    skipped_sources: Vec<SkippedSource>,
}

impl RunReport {
    pub fn record(&mut self, outcome: DispatchOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn skip(&mut self, skipped: SkippedSource) {
        self.skipped_sources.push(skipped);
    }

    /// Number of dispatch attempts
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[DispatchOutcome] {
        &self.outcomes
    }

    pub fn skipped_sources(&self) -> &[SkippedSource] {
        &self.skipped_sources
    }

    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_sent()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.sent_count()
    }
}
