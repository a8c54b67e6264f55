//! # LearnHub Core
//!
//! Shared building blocks for LearnHub services.
//!
//! ## Modules
//!
//! - `config`: Configuration loading and validation
//! - `database`: Shared PostgreSQL connection pool
//! - `error`: Error types and handling
//! - `hooks`: Hook payloads fired by platform subsystems
//! - `observability`: Structured logging initialisation

pub mod config;
pub mod database;
pub mod error;
pub mod hooks;
pub mod observability;

pub use config::{load_dotenv, parse_env_var, ConfigLoader, DatabaseConfig, SiteConfig};
pub use database::DatabasePool;
pub use error::LearnHubError;
pub use hooks::{AfterUserEnrolled, EnrolInstance, EnrolmentStatus, Hook, UserEnrolment};
pub use observability::{init_logging, LogConfig, LogFormat};

/// Result type alias for LearnHub core operations
pub type Result<T> = std::result::Result<T, LearnHubError>;
