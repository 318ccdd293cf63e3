//! Store and service wiring.

use std::sync::Arc;

use quillgate_audit::{AuditLog, AuditRecorder, LogQueryService};
use quillgate_infra::{
    AppConfig, ContentStore, InMemoryAuditLog, InMemoryContentStore, InMemoryUserStore,
    Persistence, PrincipalResolver, UserDirectory, UserStore,
};

/// Everything handlers need, shared behind an `Arc` via `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub content: Arc<dyn ContentStore>,
    pub recorder: AuditRecorder,
    pub logs: LogQueryService,
    pub resolver: PrincipalResolver,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        content: Arc<dyn ContentStore>,
        audit_log: Arc<dyn AuditLog>,
    ) -> Self {
        let directory = Arc::new(UserDirectory::new(Arc::clone(&users)));
        Self {
            recorder: AuditRecorder::new(Arc::clone(&audit_log)),
            logs: LogQueryService::new(audit_log, directory),
            resolver: PrincipalResolver::new(Arc::clone(&users)),
            users,
            content,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryAuditLog::new()),
        )
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.persistence {
        Persistence::InMemory => Ok(AppServices::in_memory()),
        Persistence::Postgres { database_url } => build_persistent_services(database_url).await,
    }
}

#[cfg(feature = "postgres")]
async fn build_persistent_services(database_url: &str) -> anyhow::Result<AppServices> {
    use anyhow::Context;
    use quillgate_infra::{migrate, PostgresAuditLog, PostgresContentStore, PostgresUserStore};

    let pool = sqlx::PgPool::connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    migrate(&pool).await.context("failed to apply schema")?;
    tracing::info!("using Postgres stores");

    Ok(AppServices::new(
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(PostgresContentStore::new(pool.clone())),
        Arc::new(PostgresAuditLog::new(pool)),
    ))
}

#[cfg(not(feature = "postgres"))]
async fn build_persistent_services(_database_url: &str) -> anyhow::Result<AppServices> {
    tracing::warn!(
        "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
    );
    Ok(AppServices::in_memory())
}
