//! Process configuration, read once at startup.
//!
//! Nothing below the binary reads the environment: the resulting [`AppConfig`]
//! is passed down explicitly.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use quillgate_auth::DEFAULT_TOKEN_TTL;
use quillgate_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Upper bound for `TOKEN_TTL_HOURS` (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres { database_url: String },
}

impl core::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Persistence::InMemory => f.write_str("InMemory"),
            Persistence::Postgres { .. } => f.debug_struct("Postgres").finish_non_exhaustive(),
        }
    }
}

/// Admin account created at startup when no user holds its email.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub token_ttl: Duration,
    pub log_format: LogFormat,
    pub persistence: Persistence,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("environment", &self.environment)
            .field("token_ttl", &self.token_ttl)
            .field("log_format", &self.log_format)
            .field("persistence", &self.persistence)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let environment = match get("APP_ENV").map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let token_ttl = match get("TOKEN_TTL_HOURS") {
            None => DEFAULT_TOKEN_TTL,
            Some(raw) => {
                let hours = raw
                    .parse::<i64>()
                    .map_err(|e| ConfigError::invalid("TOKEN_TTL_HOURS", e.to_string()))?;
                if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
                    return Err(ConfigError::invalid(
                        "TOKEN_TTL_HOURS",
                        format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
                    ));
                }
                Duration::try_hours(hours)
                    .ok_or_else(|| ConfigError::invalid("TOKEN_TTL_HOURS", "out of range"))?
            }
        };

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", e.to_string()))?,
        };

        let persistent = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw
                .to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|e| ConfigError::invalid("USE_PERSISTENT_STORES", e.to_string()))?,
        };
        let persistence = if persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            Persistence::Postgres { database_url }
        } else {
            Persistence::InMemory
        };

        let bootstrap_admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: get("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            jwt_secret,
            bind_addr,
            environment,
            token_ttl,
            log_format,
            persistence,
            bootstrap_admin,
        })
    }

    /// Minimal in-memory configuration for tests.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            environment: Environment::Development,
            token_ttl: DEFAULT_TOKEN_TTL,
            log_format: LogFormat::Pretty,
            persistence: Persistence::InMemory,
            bootstrap_admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(move |k| map.get(k).cloned())
    }

    #[test]
    fn secret_is_required() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
        assert_eq!(
            config(&[("JWT_SECRET", "   ")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.token_ttl, Duration::hours(24));
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.persistence, Persistence::InMemory);
        assert!(cfg.bootstrap_admin.is_none());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("JWT_SECRET", "s3cret"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("APP_ENV", "Production"),
            ("TOKEN_TTL_HOURS", "2"),
            ("LOG_FORMAT", "pretty"),
            ("USE_PERSISTENT_STORES", "TRUE"),
            ("DATABASE_URL", "postgres://localhost/quillgate"),
            ("ADMIN_EMAIL", "root@example.com"),
            ("ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert!(cfg.environment.is_production());
        assert_eq!(cfg.token_ttl, Duration::hours(2));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(matches!(cfg.persistence, Persistence::Postgres { .. }));
        let admin = cfg.bootstrap_admin.unwrap();
        assert_eq!(admin.name, "Administrator");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", "0")]),
            Err(ConfigError::Invalid { key: "TOKEN_TTL_HOURS", .. })
        ));
        assert!(matches!(
            config(&[("JWT_SECRET", "s"), ("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
        assert_eq!(
            config(&[("JWT_SECRET", "s"), ("USE_PERSISTENT_STORES", "true")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        assert_eq!(
            config(&[("JWT_SECRET", "s"), ("ADMIN_EMAIL", "a@b.c")]).unwrap_err(),
            ConfigError::Missing("ADMIN_PASSWORD")
        );
    }

    #[test]
    fn token_ttl_is_bounded() {
        for raw in ["8761", "10000000000", "99999999999999999"] {
            assert!(
                matches!(
                    config(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", raw)]),
                    Err(ConfigError::Invalid { key: "TOKEN_TTL_HOURS", .. })
                ),
                "{raw} should be rejected"
            );
        }
        let cfg = config(&[("JWT_SECRET", "s"), ("TOKEN_TTL_HOURS", "8760")]).unwrap();
        assert_eq!(cfg.token_ttl, Duration::hours(MAX_TOKEN_TTL_HOURS));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = config(&[
            ("JWT_SECRET", "topsecret"),
            ("ADMIN_EMAIL", "root@example.com"),
            ("ADMIN_PASSWORD", "hunter2"),
        ])
        .unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("hunter2"));
    }
}
