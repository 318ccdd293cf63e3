//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / Io / Tls / other | N/A | `Unavailable` |
//!
//! Rows holding an unknown role, status or action are reported as
//! `Unavailable` rather than silently dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use quillgate_audit::{AuditAction, AuditEntry, AuditLog, AuditMetadata, LogFilter, PageRequest};
use quillgate_auth::{normalize_email, Role, User};
use quillgate_content::{ContentItem, ContentStatus};
use quillgate_core::{AuditLogId, ContentId, StoreError, UserId};

use super::{ContentStore, UserStore};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Create tables and indexes if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::unavailable(format!("connection pool closed in {}", operation))
        }
        other => StoreError::unavailable(format!("{} failed: {}", operation, other)),
    }
}

fn corrupt(what: &str, err: impl core::fmt::Display) -> StoreError {
    StoreError::unavailable(format!("corrupt {} row: {}", what, err))
}

fn ids_to_uuids<T: Copy>(ids: &[T], f: impl Fn(&T) -> Uuid) -> Vec<Uuid> {
    ids.iter().map(f).collect()
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role").map_err(|e| corrupt("user", e))?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(|e| corrupt("user", e))?),
        email: row.try_get("email").map_err(|e| corrupt("user", e))?,
        name: row.try_get("name").map_err(|e| corrupt("user", e))?,
        password_hash: row.try_get("password_hash").map_err(|e| corrupt("user", e))?,
        role: role.parse::<Role>().map_err(|e| corrupt("user", e))?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("user", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("user", e))?,
    })
}

fn content_from_row(row: &PgRow) -> Result<ContentItem, StoreError> {
    let status: String = row.try_get("status").map_err(|e| corrupt("content", e))?;
    Ok(ContentItem {
        id: ContentId::from_uuid(row.try_get("id").map_err(|e| corrupt("content", e))?),
        title: row.try_get("title").map_err(|e| corrupt("content", e))?,
        body: row.try_get("body").map_err(|e| corrupt("content", e))?,
        status: status.parse::<ContentStatus>().map_err(|e| corrupt("content", e))?,
        author_id: UserId::from_uuid(row.try_get("author_id").map_err(|e| corrupt("content", e))?),
        created_at: row.try_get("created_at").map_err(|e| corrupt("content", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("content", e))?,
    })
}

fn entry_from_row(row: &PgRow) -> Result<AuditEntry, StoreError> {
    let action: String = row.try_get("action").map_err(|e| corrupt("audit_log", e))?;
    let meta: serde_json::Value = row.try_get("meta").map_err(|e| corrupt("audit_log", e))?;
    let metadata = match meta {
        serde_json::Value::Object(map) => map,
        _ => AuditMetadata::new(),
    };
    Ok(AuditEntry {
        id: AuditLogId::from_uuid(row.try_get("id").map_err(|e| corrupt("audit_log", e))?),
        actor_id: UserId::from_uuid(row.try_get("actor_id").map_err(|e| corrupt("audit_log", e))?),
        action: action.parse::<AuditAction>().map_err(|e| corrupt("audit_log", e))?,
        metadata,
        created_at: row.try_get("created_at").map_err(|e| corrupt("audit_log", e))?,
    })
}

const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at, updated_at";
const CONTENT_COLUMNS: &str = "id, title, body, status, author_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(normalize_email(&user.email))
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
            .bind(ids_to_uuids(ids, |id| *id.as_uuid()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_many_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn update_role(
        &self,
        id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(role.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user_role", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PostgresContentStore {
    #[instrument(skip(self, item), fields(content_id = %item.id))]
    async fn insert(&self, item: ContentItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO content (id, title, body, status, author_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*item.id.as_uuid())
        .bind(&item.title)
        .bind(&item.body)
        .bind(item.status.as_str())
        .bind(*item.author_id.as_uuid())
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_content", e))?;
        Ok(())
    }

    async fn get(&self, id: ContentId) -> Result<Option<ContentItem>, StoreError> {
        let row = sqlx::query(&format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_content", e))?;
        row.as_ref().map(content_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<ContentItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_content", e))?;
        rows.iter().map(content_from_row).collect()
    }

    #[instrument(skip(self, item), fields(content_id = %item.id))]
    async fn update(&self, item: ContentItem) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE content
            SET title = $2, body = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(*item.id.as_uuid())
        .bind(&item.title)
        .bind(&item.body)
        .bind(item.status.as_str())
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_content", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ContentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_content", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    #[instrument(skip(self, entry), fields(action = %entry.action, actor_id = %entry.actor_id))]
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, actor_id, action, meta, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*entry.id.as_uuid())
        .bind(*entry.actor_id.as_uuid())
        .bind(entry.action.as_str())
        .bind(serde_json::Value::Object(entry.metadata))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_audit_entry", e))?;
        Ok(())
    }

    async fn query(
        &self,
        filter: &LogFilter,
        page: PageRequest,
    ) -> Result<(Vec<AuditEntry>, u64), StoreError> {
        // NULL parameters disable the corresponding filter.
        let action = filter.action.map(|a| a.as_str());
        let actor = filter.actor_id.map(|id| *id.as_uuid());

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total FROM audit_log
            WHERE ($1::text IS NULL OR action = $1)
              AND ($2::uuid IS NULL OR actor_id = $2)
            "#,
        )
        .bind(action)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_audit_entries", e))?
        .try_get("total")
        .map_err(|e| corrupt("audit_log count", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, actor_id, action, meta, created_at FROM audit_log
            WHERE ($1::text IS NULL OR action = $1)
              AND ($2::uuid IS NULL OR actor_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(action)
        .bind(actor)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_audit_entries", e))?;

        let entries = rows.iter().map(entry_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok((entries, u64::try_from(total).unwrap_or(0)))
    }

    async fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<AuditEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, actor_id, action, meta, created_at FROM audit_log WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("audit_entries_since", e))?;
        rows.iter().map(entry_from_row).collect()
    }
}
