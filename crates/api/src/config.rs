use booknet_core::access::DEFAULT_PUBLIC_PATHS;

use crate::auth::activation::ActivationConfig;
use crate::auth::jwt::JwtConfig;
use crate::mail::EmailConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8088`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Path patterns reachable without authentication.
    pub public_paths: Vec<String>,
    /// How often stale tokens are purged, in seconds (default: `3600`).
    pub token_purge_interval_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Activation code settings.
    pub activation: ActivationConfig,
    /// SMTP settings; `None` disables email delivery.
    pub email: Option<EmailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `8088`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:4200`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `TOKEN_PURGE_INTERVAL_SECS` | `3600`                     |
    ///
    /// See [`JwtConfig::from_env`], [`ActivationConfig::from_env`], and
    /// [`EmailConfig::from_env`] for the nested sections.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8088".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4200".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let token_purge_interval_secs: u64 = std::env::var("TOKEN_PURGE_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("TOKEN_PURGE_INTERVAL_SECS must be a valid u64");
        assert!(token_purge_interval_secs > 0, "TOKEN_PURGE_INTERVAL_SECS must be positive");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_paths: default_public_paths(),
            token_purge_interval_secs,
            jwt: JwtConfig::from_env(),
            activation: ActivationConfig::from_env(),
            email: EmailConfig::from_env(),
        }
    }
}

pub fn default_public_paths() -> Vec<String> {
    DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()
}
