//! Configuration validation.
//!
//! Collects every problem in one pass so a misconfigured deployment fails
//! at startup with the full list.

use crate::AppConfig;
use std::fmt;
use uuid::Uuid;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid.
    InvalidPort { name: String, value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Duration value must be positive.
    NonPositiveDuration { name: String },
    /// Pagination limits are inconsistent.
    InvalidPageLimits { default_limit: u32, max_limit: u32 },
    /// Admin credentials are missing.
    MissingAdminCredentials,
    /// Admin author id is not a UUID.
    InvalidAdminUserId { value: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({}) cannot be greater than max ({})",
                    min, max
                )
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveDuration { name } => {
                write!(f, "'{}' must be positive", name)
            }
            Self::InvalidPageLimits {
                default_limit,
                max_limit,
            } => {
                write!(
                    f,
                    "Invalid pagination limits: default ({}) must be between 1 and max ({})",
                    default_limit, max_limit
                )
            }
            Self::MissingAdminCredentials => {
                write!(f, "Admin username and password must both be set")
            }
            Self::InvalidAdminUserId { value } => {
                write!(f, "Admin user id '{}' is not a UUID", value)
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{}' (valid: json, pretty)", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: &'static [&'static str] = &["json", "pretty"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(config, &mut errors);
        Self::validate_database(config, &mut errors);
        Self::validate_cache(config, &mut errors);
        Self::validate_security(config, &mut errors);
        Self::validate_observability(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: 0,
            });
        }
        if config.server.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "server.request_timeout_secs".to_string(),
            });
        }
    }

    fn validate_database(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let db = &config.database;
        if db.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !db.url.starts_with("mysql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mysql://".to_string(),
            });
        }

        if db.min_connections > db.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: db.min_connections,
                max: db.max_connections,
            });
        }
        if db.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "database.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_cache(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.redis.enabled
            && !config.redis.url.starts_with("redis://")
            && !config.redis.url.starts_with("rediss://")
        {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }
        if config.cache.ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "cache.ttl_secs".to_string(),
            });
        }

        let pagination = &config.pagination;
        if pagination.default_limit == 0 || pagination.default_limit > pagination.max_limit {
            errors.push(ConfigValidationError::InvalidPageLimits {
                default_limit: pagination.default_limit,
                max_limit: pagination.max_limit,
            });
        }
    }

    fn validate_security(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let security = &config.security;
        if security.admin_username.is_empty() || security.admin_password.is_empty() {
            errors.push(ConfigValidationError::MissingAdminCredentials);
        }
        if Uuid::parse_str(&security.admin_user_id).is_err() {
            errors.push(ConfigValidationError::InvalidAdminUserId {
                value: security.admin_user_id.clone(),
            });
        }
    }

    fn validate_observability(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.observability.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.observability.log_level.clone(),
            });
        }
        let format = config.observability.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.observability.log_format.clone(),
            });
        }
    }
}
