pub mod directory;

pub use directory::{InMemoryUserDirectory, PostgresUserDirectory, UserDirectory};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Username carried by placeholder recipients
pub const NOREPLY_USERNAME: &str = "noreply";

/// A stored user account, as read from the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub lang: Option<String>,
    pub confirmed: bool,
    pub suspended: bool,
}

/// Someone a notification can be addressed to
///
/// Either a real account or a placeholder standing in for an address that has
/// no account. Placeholders have no id and must never be written back to the
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub id: Option<Uuid>,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub locale: Option<String>,
    pub confirmed: bool,
    pub suspended: bool,
    is_synthetic: bool,
}

impl Recipient {
    pub fn from_account(account: Account) -> Self {
        Self {
            id: Some(account.id),
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            locale: account.lang.filter(|lang| !lang.trim().is_empty()),
            confirmed: account.confirmed,
            suspended: account.suspended,
            is_synthetic: false,
        }
    }

    /// No-reply identity redirected to `email`
    pub fn placeholder(email: &str, noreply_name: &str) -> Self {
        Self {
            id: None,
            username: NOREPLY_USERNAME.to_string(),
            email: email.trim().to_string(),
            first_name: noreply_name.to_string(),
            last_name: String::new(),
            locale: None,
            confirmed: true,
            suspended: false,
            is_synthetic: true,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }

    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.edu".to_string(),
            first_name: "Jo".to_string(),
            last_name: "Doe".to_string(),
            lang: Some("fr".to_string()),
            confirmed: true,
            suspended: false,
        }
    }

    #[test]
    fn test_from_account_keeps_identity() {
        let account = account();
        let recipient = Recipient::from_account(account.clone());

        assert_eq!(recipient.id, Some(account.id));
        assert_eq!(recipient.locale.as_deref(), Some("fr"));
        assert_eq!(recipient.full_name(), "Jo Doe");
        assert!(!recipient.is_synthetic());
    }

    #[test]
    fn test_blank_lang_is_treated_as_unset() {
        let mut account = account();
        account.lang = Some("  ".to_string());

        assert_eq!(Recipient::from_account(account).locale, None);
    }

    #[test]
    fn test_placeholder_shape() {
        let recipient = Recipient::placeholder("  ops@example.edu ", "Do not reply to this email");

        assert_eq!(recipient.id, None);
        assert_eq!(recipient.username, NOREPLY_USERNAME);
        assert_eq!(recipient.email, "ops@example.edu");
        assert_eq!(recipient.last_name, "");
        assert!(recipient.confirmed);
        assert!(!recipient.suspended);
        assert!(recipient.is_synthetic());
        assert_eq!(recipient.full_name(), "Do not reply to this email");
    }

    #[test]
    fn test_full_name_falls_back_to_email() {
        let recipient = Recipient::placeholder("ops@example.edu", "");
        assert_eq!(recipient.full_name(), "ops@example.edu");
    }
}
