//! Shared configuration loader module for LearnHub services
//!
//! This module provides a unified configuration loading system with environment variable
//! parsing, validation, and support for .env files. All configuration uses the
//! `LEARNHUB_` prefix for environment variables.
//!
//! # Features
//!
//! - Environment variable parsing with typed values
//! - .env file support via dotenvy
//! - Configuration validation with clear error messages
//! - Default values for optional fields
//! - Configuration override hierarchy: defaults < .env < environment
//!
//! # Example
//!
//! ```no_run
//! use learnhub_core::config::{ConfigLoader, DatabaseConfig, SiteConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! learnhub_core::config::load_dotenv();
//!
//! let db_config = DatabaseConfig::from_env()?;
//! let site_config = SiteConfig::from_env()?;
//!
//! db_config.validate()?;
//! site_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::LearnHubError;
use crate::observability::LogFormat;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::time::Duration;
use url::Url;

/// Largest timezone offset accepted, in minutes (UTC+14:00 / UTC-14:00)
const MAX_TIMEZONE_OFFSET_MINUTES: i32 = 14 * 60;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// Reads environment variables with the `LEARNHUB_` prefix and constructs
    /// a configuration instance with defaults for missing optional values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if:
    /// - Required environment variables are missing
    /// - Environment variable values cannot be parsed
    fn from_env() -> Result<Self, LearnHubError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), LearnHubError>;
}

/// Database configuration
///
/// # Environment Variables
///
/// - `LEARNHUB_DATABASE_URL` or `DATABASE_URL` (required): PostgreSQL connection URL
/// - `LEARNHUB_DATABASE_MAX_CONNECTIONS` (optional): Maximum pool connections (default: 5)
/// - `LEARNHUB_DATABASE_MIN_CONNECTIONS` (optional): Minimum pool connections (default: 1)
/// - `LEARNHUB_DATABASE_CONNECT_TIMEOUT` (optional): Connection timeout in seconds (default: 30)
/// - `LEARNHUB_DATABASE_IDLE_TIMEOUT` (optional): Idle connection timeout in seconds (default: 600)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle connection timeout duration
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/learnhub".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl ConfigLoader for DatabaseConfig {
    fn from_env() -> Result<Self, LearnHubError> {
        let url = std::env::var("LEARNHUB_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| LearnHubError::ConfigurationError {
                message: "DATABASE_URL or LEARNHUB_DATABASE_URL must be set".to_string(),
                key: Some("LEARNHUB_DATABASE_URL".to_string()),
            })?;

        let defaults = DatabaseConfig::default();
        let max_connections =
            parse_env_var("LEARNHUB_DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections =
            parse_env_var("LEARNHUB_DATABASE_MIN_CONNECTIONS", defaults.min_connections)?;
        let connect_timeout_secs = parse_env_var("LEARNHUB_DATABASE_CONNECT_TIMEOUT", 30u64)?;
        let idle_timeout_secs = parse_env_var("LEARNHUB_DATABASE_IDLE_TIMEOUT", 600u64)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    fn validate(&self) -> Result<(), LearnHubError> {
        Url::parse(&self.url).map_err(|e| LearnHubError::ConfigurationError {
            message: format!("Invalid DATABASE_URL: {}", e),
            key: Some("LEARNHUB_DATABASE_URL".to_string()),
        })?;

        if self.max_connections == 0 {
            return Err(LearnHubError::ConfigurationError {
                message: "max_connections must be greater than 0".to_string(),
                key: Some("LEARNHUB_DATABASE_MAX_CONNECTIONS".to_string()),
            });
        }

        if self.min_connections > self.max_connections {
            return Err(LearnHubError::ConfigurationError {
                message: format!(
                    "min_connections ({}) cannot exceed max_connections ({})",
                    self.min_connections, self.max_connections
                ),
                key: Some("LEARNHUB_DATABASE_MIN_CONNECTIONS".to_string()),
            });
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(LearnHubError::ConfigurationError {
                message: "connect_timeout must be greater than 0 seconds".to_string(),
                key: Some("LEARNHUB_DATABASE_CONNECT_TIMEOUT".to_string()),
            });
        }

        Ok(())
    }
}

/// Site-wide settings
///
/// Replaces the platform's global configuration object: everything a task needs
/// to know about the site is passed explicitly through this struct.
///
/// # Environment Variables
///
/// - `LEARNHUB_SITE_NAME` (optional): Full site name used in email subjects (default: "LearnHub")
/// - `LEARNHUB_WWWROOT` (optional): Public base URL of the site (default: "http://localhost:8080")
/// - `LEARNHUB_SUPPORT_EMAIL` (optional): Sender address for system mail
/// - `LEARNHUB_SUPPORT_NAME` (optional): Sender display name for system mail
/// - `LEARNHUB_DEFAULT_LANG` (optional): Language for users without one (default: "en")
/// - `LEARNHUB_TIMEZONE_OFFSET_MINUTES` (optional): Offset used for calendar dates (default: 0)
/// - `LEARNHUB_LOG_FORMAT` (optional): `json` or `pretty` (default: "json")
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site_name: String,
    pub wwwroot: String,
    pub support_email: String,
    pub support_name: String,
    pub default_lang: String,
    pub timezone_offset_minutes: i32,
    pub log_format: LogFormat,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "LearnHub".to_string(),
            wwwroot: "http://localhost:8080".to_string(),
            support_email: "support@learnhub.local".to_string(),
            support_name: "LearnHub Support".to_string(),
            default_lang: "en".to_string(),
            timezone_offset_minutes: 0,
            log_format: LogFormat::Json,
        }
    }
}

impl SiteConfig {
    /// Fixed offset used to turn timestamps into calendar dates
    pub fn timezone(&self) -> FixedOffset {
        offset_seconds(self.timezone_offset_minutes)
            .ok()
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Calendar date of `instant` in the site timezone
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone()).date_naive()
    }

    /// Current calendar date in the site timezone
    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }

    /// Absolute URL for a site-relative path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.wwwroot.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl ConfigLoader for SiteConfig {
    fn from_env() -> Result<Self, LearnHubError> {
        let defaults = SiteConfig::default();

        let site_name = std::env::var("LEARNHUB_SITE_NAME").unwrap_or(defaults.site_name);
        let wwwroot = std::env::var("LEARNHUB_WWWROOT").unwrap_or(defaults.wwwroot);
        let support_email =
            std::env::var("LEARNHUB_SUPPORT_EMAIL").unwrap_or(defaults.support_email);
        let support_name = std::env::var("LEARNHUB_SUPPORT_NAME").unwrap_or(defaults.support_name);
        let default_lang = std::env::var("LEARNHUB_DEFAULT_LANG").unwrap_or(defaults.default_lang);
        let timezone_offset_minutes = parse_env_var(
            "LEARNHUB_TIMEZONE_OFFSET_MINUTES",
            defaults.timezone_offset_minutes,
        )?;
        offset_seconds(timezone_offset_minutes)?;
        let log_format = parse_env_var("LEARNHUB_LOG_FORMAT", defaults.log_format)?;

        Ok(Self {
            site_name,
            wwwroot,
            support_email,
            support_name,
            default_lang,
            timezone_offset_minutes,
            log_format,
        })
    }

    fn validate(&self) -> Result<(), LearnHubError> {
        Url::parse(&self.wwwroot).map_err(|e| LearnHubError::ConfigurationError {
            message: format!("Invalid wwwroot: {}", e),
            key: Some("LEARNHUB_WWWROOT".to_string()),
        })?;

        if !self.support_email.contains('@') {
            return Err(LearnHubError::ConfigurationError {
                message: format!("Invalid support email '{}'", self.support_email),
                key: Some("LEARNHUB_SUPPORT_EMAIL".to_string()),
            });
        }

        if self.default_lang.trim().is_empty() {
            return Err(LearnHubError::ConfigurationError {
                message: "default_lang must not be empty".to_string(),
                key: Some("LEARNHUB_DEFAULT_LANG".to_string()),
            });
        }

        if self.timezone_offset_minutes.abs() > MAX_TIMEZONE_OFFSET_MINUTES {
            return Err(LearnHubError::ConfigurationError {
                message: format!(
                    "timezone offset {} minutes is outside ±{}",
                    self.timezone_offset_minutes, MAX_TIMEZONE_OFFSET_MINUTES
                ),
                key: Some("LEARNHUB_TIMEZONE_OFFSET_MINUTES".to_string()),
            });
        }

        Ok(())
    }
}

/// Offset in seconds, rejecting values that do not fit
fn offset_seconds(minutes: i32) -> Result<i32, LearnHubError> {
    minutes
        .checked_mul(60)
        .ok_or_else(|| LearnHubError::ConfigurationError {
            message: format!("timezone offset {} minutes is out of range", minutes),
            key: Some("LEARNHUB_TIMEZONE_OFFSET_MINUTES".to_string()),
        })
}

/// Helper function to parse environment variable with default value
///
/// # Errors
///
/// Returns a `ConfigurationError` if the value is set but cannot be parsed
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, LearnHubError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| LearnHubError::ConfigurationError {
                    message: format!("Failed to parse {}: {}", key, e),
                    key: Some(key.to_string()),
                })
        })
        .unwrap_or(Ok(default))
}

/// Load .env file if present
///
/// Does not return an error if the .env file is not found.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::env;

    fn set_test_env(key: &str, value: &str) {
        env::set_var(key, value);
    }

    fn clear_test_env(key: &str) {
        env::remove_var(key);
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_database_config_from_env() {
        set_test_env("LEARNHUB_DATABASE_URL", "postgresql://localhost/test");
        set_test_env("LEARNHUB_DATABASE_MAX_CONNECTIONS", "12");

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.url, "postgresql://localhost/test");
        assert_eq!(config.max_connections, 12);

        clear_test_env("LEARNHUB_DATABASE_URL");
        clear_test_env("LEARNHUB_DATABASE_MAX_CONNECTIONS");
    }

    #[test]
    fn test_database_config_validation_min_exceeds_max() {
        let mut config = DatabaseConfig::default();
        config.min_connections = 10;
        config.max_connections = 2;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_site_config_rejects_bad_wwwroot() {
        let mut config = SiteConfig::default();
        config.wwwroot = "not a url".to_string();

        let err = config.validate().unwrap_err();
        assert_eq!(err.config_key(), Some("LEARNHUB_WWWROOT"));
    }

    #[test]
    fn test_site_config_rejects_out_of_range_offset() {
        let mut config = SiteConfig::default();
        config.timezone_offset_minutes = 15 * 60;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_site_config_unparseable_offset() {
        set_test_env("LEARNHUB_TIMEZONE_OFFSET_MINUTES", "east");

        let result = SiteConfig::from_env();
        assert!(matches!(
            result,
            Err(LearnHubError::ConfigurationError { .. })
        ));

        clear_test_env("LEARNHUB_TIMEZONE_OFFSET_MINUTES");
    }

    #[test]
    fn test_site_config_overflowing_offset() {
        let err = offset_seconds(i32::MAX).unwrap_err();
        assert_eq!(err.config_key(), Some("LEARNHUB_TIMEZONE_OFFSET_MINUTES"));
        assert_eq!(offset_seconds(-90).unwrap(), -5400);

        let mut config = SiteConfig::default();
        config.timezone_offset_minutes = i32::MAX;
        assert_eq!(config.timezone(), Utc.fix());
    }

    #[test]
    fn test_date_of_uses_configured_offset() {
        // 2024-03-01T23:30:00Z
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();

        let utc_site = SiteConfig::default();
        assert_eq!(
            utc_site.date_of(instant),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );

        let mut tokyo_site = SiteConfig::default();
        tokyo_site.timezone_offset_minutes = 9 * 60;
        assert_eq!(
            tokyo_site.date_of(instant),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_site_url_joins_paths() {
        let mut config = SiteConfig::default();
        config.wwwroot = "https://learn.example.edu/".to_string();

        assert_eq!(
            config.url("/admin/tool/oauth2/issuers.php"),
            "https://learn.example.edu/admin/tool/oauth2/issuers.php"
        );
    }
}
