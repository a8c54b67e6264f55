use super::{Issuer, ServiceType};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::RwLock;

/// Read access to configured issuers
#[async_trait]
pub trait IssuerRegistry: Send + Sync {
    async fn list_issuers(&self, include_disabled: bool) -> Result<Vec<Issuer>>;
}

#[derive(Debug, sqlx::FromRow)]
struct IssuerRow {
    id: i64,
    name: String,
    enabled: bool,
    servicetype: Option<String>,
    clientsecret: Option<String>,
}

impl From<IssuerRow> for Issuer {
    fn from(row: IssuerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            enabled: row.enabled,
            service_type: ServiceType::from(row.servicetype.unwrap_or_default()),
            client_secret: row.clientsecret.unwrap_or_default(),
        }
    }
}

pub struct PostgresIssuerRegistry {
    pool: PgPool,
}

impl PostgresIssuerRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IssuerRegistry for PostgresIssuerRegistry {
    async fn list_issuers(&self, include_disabled: bool) -> Result<Vec<Issuer>> {
        let rows = sqlx::query_as::<_, IssuerRow>(
            r#"
            SELECT id, name, enabled, servicetype, clientsecret
            FROM oauth2_issuer
            WHERE enabled OR $1
            ORDER BY sortorder, id
            "#,
        )
        .bind(include_disabled)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Issuer::from).collect())
    }
}

/// Issuer registry backed by a vector, for tests and local runs
#[derive(Default)]
pub struct InMemoryIssuerRegistry {
    issuers: RwLock<Vec<Issuer>>,
}

impl InMemoryIssuerRegistry {
    pub fn new(issuers: Vec<Issuer>) -> Self {
        Self {
            issuers: RwLock::new(issuers),
        }
    }
}

#[async_trait]
impl IssuerRegistry for InMemoryIssuerRegistry {
    async fn list_issuers(&self, include_disabled: bool) -> Result<Vec<Issuer>> {
        let issuers = self
            .issuers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok(issuers
            .iter()
            .filter(|issuer| include_disabled || issuer.enabled)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(id: i64, enabled: bool) -> Issuer {
        Issuer {
            id,
            name: format!("issuer-{}", id),
            enabled,
            service_type: ServiceType::Apple,
            client_secret: String::new(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_registry_filters_disabled() {
        let registry = InMemoryIssuerRegistry::new(vec![issuer(1, true), issuer(2, false)]);

        let all = registry.list_issuers(true).await.unwrap();
        assert_eq!(all.len(), 2);

        let enabled = registry.list_issuers(false).await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, 1);
    }

    #[test]
    fn test_row_conversion_defaults_missing_columns() {
        let row = IssuerRow {
            id: 9,
            name: "Legacy".to_string(),
            enabled: true,
            servicetype: None,
            clientsecret: None,
        };

        let issuer = Issuer::from(row);
        assert_eq!(issuer.service_type, ServiceType::Custom(String::new()));
        assert!(issuer.client_secret.is_empty());
    }
}
