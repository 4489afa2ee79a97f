//! Configuration module for the programs backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Application name used as the prefix of alert headers (`X-<app>-alert`)
    pub app_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("PROGRAMS_API_PSK").ok();

        let db_path = env::var("PROGRAMS_DB_PATH")
            .unwrap_or_else(|_| "./data/programs.sqlite".to_string())
            .into();

        let bind_addr = env::var("PROGRAMS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid PROGRAMS_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("PROGRAMS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let app_name = env::var("PROGRAMS_APP_NAME").unwrap_or_else(|_| "programsApp".to_string());

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            app_name,
        })
    }
}
