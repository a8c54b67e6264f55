pub mod email;
pub mod error;
pub mod i18n;
pub mod oauth2;
pub mod settings;
pub mod task;
pub mod user;

pub use email::{
    ConsoleTransport, EmailConfig, EmailError, EmailProviderConfig, MailTransport, Mailbox,
    OutgoingMail, SendGridTransport,
};
pub use error::{AuthError, Result};
pub use i18n::{Localizer, StringCatalog, StringParams};
pub use oauth2::{
    decode_claims, decode_expiry, ClaimDecodeError, ClientSecretClaims, ExpiryClaim,
    InMemoryIssuerRegistry, Issuer, IssuerRegistry, PostgresIssuerRegistry, ServiceType,
};
pub use settings::{ConfigStore, InMemoryConfigStore, PostgresConfigStore, WatchConfig};
pub use task::{
    DispatchOutcome, DispatchStatus, ExpiryReminderTask, NotificationContext,
    NotificationDispatcher, RunReport, ScheduledTask, SkippedSource, TaskScheduler,
};
pub use user::{
    Account, InMemoryUserDirectory, PostgresUserDirectory, Recipient, UserDirectory,
};
