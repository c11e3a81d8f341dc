//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the ShiftFlow API
//! server. It retrieves configuration values from environment variables and provides
//! defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `RULE_MAX_DAILY_MINUTES`, `RULE_MAX_DAILY_OVERTIME_MINUTES`,
//!   `RULE_MAX_WEEKLY_MINUTES`, `RULE_MAX_WEEKLY_OVERTIME_MINUTES`,
//!   `RULE_MIN_REST_MINUTES`, `RULE_MAX_DAILY_SHIFTS`, `RULE_MAX_WEEKLY_SHIFTS`,
//!   `RULE_MAX_CONSECUTIVE_DAYS`, `RULE_MAX_WEEKEND_SHIFTS`: labor-rule caps,
//!   defaulting to the statutory baseline when unset.

use eyre::{Result, WrapErr};
use std::env;
use std::str::FromStr;
use tracing::Level;

use shiftflow_core::rules::RuleConfig;

/// Configuration for the ShiftFlow API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Labor-law rule caps
    pub rules: RuleConfig,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - A RULE_* override is set but cannot be parsed as a number
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let rules = rules_from_env()?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            rules,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080").
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_override<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| eyre::eyre!("Invalid {} value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Rule caps from the environment, falling back to the statutory defaults.
pub fn rules_from_env() -> Result<RuleConfig> {
    let defaults = RuleConfig::default();
    Ok(RuleConfig {
        max_daily_minutes: env_override("RULE_MAX_DAILY_MINUTES", defaults.max_daily_minutes)?,
        max_daily_overtime_minutes: env_override(
            "RULE_MAX_DAILY_OVERTIME_MINUTES",
            defaults.max_daily_overtime_minutes,
        )?,
        max_weekly_minutes: env_override("RULE_MAX_WEEKLY_MINUTES", defaults.max_weekly_minutes)?,
        max_weekly_overtime_minutes: env_override(
            "RULE_MAX_WEEKLY_OVERTIME_MINUTES",
            defaults.max_weekly_overtime_minutes,
        )?,
        min_rest_minutes: env_override("RULE_MIN_REST_MINUTES", defaults.min_rest_minutes)?,
        max_daily_shifts: env_override("RULE_MAX_DAILY_SHIFTS", defaults.max_daily_shifts)?,
        max_weekly_shifts: env_override("RULE_MAX_WEEKLY_SHIFTS", defaults.max_weekly_shifts)?,
        max_consecutive_days: env_override(
            "RULE_MAX_CONSECUTIVE_DAYS",
            defaults.max_consecutive_days,
        )?,
        max_weekend_shifts: env_override("RULE_MAX_WEEKEND_SHIFTS", defaults.max_weekend_shifts)?,
        closing_cutoff: defaults.closing_cutoff,
        opening_cutoff: defaults.opening_cutoff,
    })
}
