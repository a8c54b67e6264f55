use super::{Account, Recipient};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Read-only lookups against the user directory
///
/// Placeholder recipients cannot be persisted through this trait.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Recipient>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipient>>;
}

pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Recipient>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, first_name, last_name, lang, confirmed, suspended
            FROM users
            WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(account.map(Recipient::from_account))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipient>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, first_name, last_name, lang, confirmed, suspended
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account.map(Recipient::from_account))
    }
}

/// Directory backed by a fixed list of accounts
#[derive(Default)]
pub struct InMemoryUserDirectory {
    accounts: Vec<Account>,
    email_lookups: AtomicUsize,
    id_lookups: AtomicUsize,
}

impl InMemoryUserDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            ..Default::default()
        }
    }

    pub fn email_lookups(&self) -> usize {
        self.email_lookups.load(Ordering::SeqCst)
    }

    pub fn id_lookups(&self) -> usize {
        self.id_lookups.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Recipient>> {
        self.email_lookups.fetch_add(1, Ordering::SeqCst);
        let email = email.trim();

        Ok(self
            .accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned()
            .map(Recipient::from_account))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipient>> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .accounts
            .iter()
            .find(|account| account.id == id)
            .cloned()
            .map(Recipient::from_account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_lookup_is_case_insensitive() {
        let id = Uuid::new_v4();
        let directory = InMemoryUserDirectory::new(vec![Account {
            id,
            username: "admin".to_string(),
            email: "Admin@Example.edu".to_string(),
            first_name: "Site".to_string(),
            last_name: "Admin".to_string(),
            lang: None,
            confirmed: true,
            suspended: false,
        }]);

        let found = directory
            .find_by_email(" admin@example.edu")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, Some(id));

        assert!(directory.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert_eq!(directory.email_lookups(), 1);
        assert_eq!(directory.id_lookups(), 1);
    }
}
