//! Infrastructure layer: persistence adapters, configuration, bootstrap.

pub mod config;
pub mod directory;
pub mod principal;
pub mod seed;
pub mod store;

pub use config::{
    AppConfig, BootstrapAdmin, ConfigError, Environment, Persistence, DEFAULT_BIND_ADDR,
    MAX_TOKEN_TTL_HOURS,
};
pub use directory::UserDirectory;
pub use principal::{PrincipalResolver, ResolveError};
pub use store::{ContentStore, InMemoryAuditLog, InMemoryContentStore, InMemoryUserStore, UserStore};
pub use seed::ensure_bootstrap_admin;

#[cfg(feature = "postgres")]
pub use store::{migrate, PostgresAuditLog, PostgresContentStore, PostgresUserStore};
