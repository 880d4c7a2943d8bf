//! Server configuration read from the environment (a `.env` file is loaded first).

use axum::http::HeaderValue;
use std::net::SocketAddr;

const DEFAULT_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub allowed_origins: Vec<String>,
    /// Request body cap in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            allowed_origins: allowed_origins_from_env(),
            body_limit: 2 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Origins that parse as header values; invalid entries are skipped.
    pub fn origin_headers(&self) -> Vec<HeaderValue> {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        if origins.is_empty() {
            DEFAULT_ORIGINS
                .iter()
                .map(|o| HeaderValue::from_static(o))
                .collect()
        } else {
            origins
        }
    }
}

/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN, falling back to
/// local development origins.
fn allowed_origins_from_env() -> Vec<String> {
    std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty())
        .or_else(|| std::env::var("FRONTEND_ORIGIN").ok().map(|o| vec![o]))
        .unwrap_or_else(|| DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_usable() {
        let config = ServerConfig::default();
        assert!(!config.host.is_empty());
        assert!(config.body_limit > 0);
        assert!(!config.origin_headers().is_empty());
    }

    #[test]
    fn test_bind_addr_parses() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            allowed_origins: vec![],
            body_limit: 1024,
        };
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
        assert!(!config.is_production());
    }

    #[test]
    fn test_invalid_origins_fall_back_to_defaults() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: "production".to_string(),
            allowed_origins: vec!["bad\norigin".to_string()],
            body_limit: 1024,
        };
        assert_eq!(config.origin_headers().len(), DEFAULT_ORIGINS.len());
        assert!(config.is_production());
    }
}
