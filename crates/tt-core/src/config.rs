//! Configuration types and loading

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Session/authentication configuration
    pub auth: AuthConfig,

    /// Insert the demo accounts on an empty database
    pub seed_database: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    /// Only send the cookie over HTTPS
    pub cookie_secure: bool,
    /// Lifetime of a regular session in minutes
    pub session_lifetime_minutes: i64,
    /// Lifetime of a "remember me" session in days
    pub persistent_session_days: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/time_tracker".to_string(),
            pool_size: 10,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "tt_session".to_string(),
            cookie_secure: false,
            session_lifetime_minutes: 60,
            persistent_session_days: 14,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v.trim(), "true" | "1" | "yes")
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            seed_database: true,
            ..Self::default()
        };

        // Database
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(size) = parse_var("DATABASE_MAX_CONNECTIONS")? {
            config.database.pool_size = size;
        }

        // Server
        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var("SERVER_PORT")? {
            config.server.port = port;
        }

        // Sessions
        if let Ok(name) = std::env::var("SESSION_COOKIE_NAME") {
            config.auth.cookie_name = name;
        }
        if let Ok(v) = std::env::var("SESSION_COOKIE_SECURE") {
            config.auth.cookie_secure = parse_bool(&v);
        }
        if let Some(minutes) = parse_var::<i64>("SESSION_LIFETIME_MINUTES")? {
            if minutes <= 0 {
                return Err(ConfigError::InvalidValue {
                    key: "SESSION_LIFETIME_MINUTES".to_string(),
                    message: "must be positive".to_string(),
                });
            }
            config.auth.session_lifetime_minutes = minutes;
        }
        if let Some(days) = parse_var("SESSION_PERSISTENT_DAYS")? {
            config.auth.persistent_session_days = days;
        }

        if let Ok(v) = std::env::var("SEED_DATABASE") {
            config.seed_database = parse_bool(&v);
        }

        Ok(config)
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.pool_size, 10);
        assert_eq!(config.auth.session_lifetime_minutes, 60);
        assert_eq!(config.auth.cookie_name, "tt_session");
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig::default();
        let addr = config.server_addr();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" 1"));
        assert!(!parse_bool("off"));
    }
}
