//! Plugin settings and expiry watch configuration

use crate::error::Result;
use crate::oauth2::ServiceType;
use async_trait::async_trait;
use learnhub_core::{parse_env_var, ConfigLoader, LearnHubError};
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Plugin owning the OAuth2 login settings
pub const AUTH_OAUTH2: &str = "auth_oauth2";
/// Comma-separated addresses that replace the site admins as reminder recipients
pub const REMINDER_EMAILS: &str = "applereminderemails";
/// Plugin name for site-wide settings
pub const CORE: &str = "core";
/// Comma-separated ids of site administrators
pub const SITE_ADMINS: &str = "siteadmins";

/// Key/value settings grouped by plugin
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get(&self, plugin: &str, name: &str) -> Result<Option<String>>;
}

pub struct PostgresConfigStore {
    pool: PgPool,
}

impl PostgresConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PostgresConfigStore {
    async fn get(&self, plugin: &str, name: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            r#"
            SELECT value
            FROM config_plugins
            WHERE plugin = $1 AND name = $2
            "#,
        )
        .bind(plugin)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }
}

#[derive(Default)]
pub struct InMemoryConfigStore {
    values: RwLock<HashMap<(String, String), String>>,
    reads: RwLock<Vec<(String, String)>>,
    read_count: AtomicUsize,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, plugin: &str, name: &str, value: &str) -> Self {
        self.set(plugin, name, value);
        self
    }

    pub fn set(&self, plugin: &str, name: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((plugin.to_string(), name.to_string()), value.to_string());
    }

    /// Whether `plugin`/`name` has been read at least once
    pub fn was_read(&self, plugin: &str, name: &str) -> bool {
        self.reads
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|(p, n)| p == plugin && n == name)
    }

    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self, plugin: &str, name: &str) -> Result<Option<String>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.reads
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((plugin.to_string(), name.to_string()));

        Ok(self
            .values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(plugin.to_string(), name.to_string()))
            .cloned())
    }
}

/// Split a comma-separated setting, trimming entries and dropping empty ones
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn interval_from_hours(hours: u64) -> std::result::Result<Duration, LearnHubError> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| LearnHubError::ConfigurationError {
            message: format!("interval of {} hours is out of range", hours),
            key: Some("LEARNHUB_EXPIRY_WATCH_INTERVAL_HOURS".to_string()),
        })
}

/// Expiry watch configuration
///
/// # Environment Variables
///
/// - `LEARNHUB_EXPIRY_WATCH_SERVICE_TYPES` (optional): Comma-separated provider tags to watch (default: "apple")
/// - `LEARNHUB_EXPIRY_WATCH_CALL_TIMEOUT_SECS` (optional): Bound on each lookup and send (default: 30)
/// - `LEARNHUB_EXPIRY_WATCH_INTERVAL_HOURS` (optional): Scheduler cadence (default: 24)
/// - `LEARNHUB_LANG_DIR` (optional): Directory of `<locale>.json` string packs
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub service_types: Vec<ServiceType>,
    pub call_timeout: Duration,
    pub interval: Duration,
    pub lang_dir: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            service_types: vec![ServiceType::Apple],
            call_timeout: Duration::from_secs(30),
            interval: Duration::from_secs(24 * 3600),
            lang_dir: None,
        }
    }
}

impl ConfigLoader for WatchConfig {
    fn from_env() -> std::result::Result<Self, LearnHubError> {
        let defaults = WatchConfig::default();

        let service_types = std::env::var("LEARNHUB_EXPIRY_WATCH_SERVICE_TYPES")
            .map(|value| {
                split_list(&value)
                    .into_iter()
                    .map(ServiceType::from)
                    .collect()
            })
            .unwrap_or(defaults.service_types);

        let call_timeout_secs = parse_env_var(
            "LEARNHUB_EXPIRY_WATCH_CALL_TIMEOUT_SECS",
            defaults.call_timeout.as_secs(),
        )?;
        let interval_hours = parse_env_var(
            "LEARNHUB_EXPIRY_WATCH_INTERVAL_HOURS",
            defaults.interval.as_secs() / 3600,
        )?;
        let lang_dir = std::env::var("LEARNHUB_LANG_DIR").ok().map(PathBuf::from);

        Ok(Self {
            service_types,
            call_timeout: Duration::from_secs(call_timeout_secs),
            interval: interval_from_hours(interval_hours)?,
            lang_dir,
        })
    }

    fn validate(&self) -> std::result::Result<(), LearnHubError> {
        if self.service_types.is_empty() {
            return Err(LearnHubError::ConfigurationError {
                message: "at least one service type must be watched".to_string(),
                key: Some("LEARNHUB_EXPIRY_WATCH_SERVICE_TYPES".to_string()),
            });
        }

        if self.call_timeout.is_zero() {
            return Err(LearnHubError::ConfigurationError {
                message: "call timeout must be greater than 0 seconds".to_string(),
                key: Some("LEARNHUB_EXPIRY_WATCH_CALL_TIMEOUT_SECS".to_string()),
            });
        }

        if self.interval.is_zero() {
            return Err(LearnHubError::ConfigurationError {
                message: "interval must be at least 1 hour".to_string(),
                key: Some("LEARNHUB_EXPIRY_WATCH_INTERVAL_HOURS".to_string()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" a@x.com, ,b@x.com,,"),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_store_tracks_reads() {
        let store = InMemoryConfigStore::new().with(AUTH_OAUTH2, REMINDER_EMAILS, "a@x.com");

        assert_eq!(
            store.get(AUTH_OAUTH2, REMINDER_EMAILS).await.unwrap(),
            Some("a@x.com".to_string())
        );
        assert_eq!(store.get(CORE, SITE_ADMINS).await.unwrap(), None);
        assert!(store.was_read(CORE, SITE_ADMINS));
        assert_eq!(store.read_count(), 2);
    }

    #[test]
    fn test_watch_config_from_env() {
        std::env::set_var("LEARNHUB_EXPIRY_WATCH_SERVICE_TYPES", "apple, keycloak");
        std::env::set_var("LEARNHUB_EXPIRY_WATCH_CALL_TIMEOUT_SECS", "5");

        let config = WatchConfig::from_env().unwrap();
        assert_eq!(
            config.service_types,
            vec![ServiceType::Apple, ServiceType::Custom("keycloak".to_string())]
        );
        assert_eq!(config.call_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());

        std::env::remove_var("LEARNHUB_EXPIRY_WATCH_SERVICE_TYPES");
        std::env::remove_var("LEARNHUB_EXPIRY_WATCH_CALL_TIMEOUT_SECS");
    }

    #[test]
    fn test_watch_config_overflowing_interval() {
        let err = interval_from_hours(u64::MAX).unwrap_err();
        assert_eq!(err.config_key(), Some("LEARNHUB_EXPIRY_WATCH_INTERVAL_HOURS"));
        assert_eq!(interval_from_hours(24).unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_watch_config_rejects_empty_service_types() {
        let config = WatchConfig {
            service_types: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
