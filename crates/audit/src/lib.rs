//! Audit trail for the dashboard.
//!
//! This crate defines the closed set of auditable actions, the append-only
//! entry model, the [`AuditLog`] persistence seam, the best-effort
//! [`AuditRecorder`], and the admin-facing [`LogQueryService`].

pub mod action;
pub mod entry;
pub mod pagination;
pub mod query;
pub mod recorder;
pub mod stats;
pub mod store;

pub use action::{AuditAction, UnknownAction};
pub use entry::{AuditEntry, AuditMetadata};
pub use pagination::{PageRequest, Pagination, PaginationError, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use query::{LogFilter, LogPage, LogQueryService, LogView, QueryError};
pub use recorder::AuditRecorder;
pub use stats::{compute_stats, ActionStat, DailyStat, InvalidWindow, LogStats, StatsWindow, UserStat};
pub use store::{ActorDirectory, ActorSummary, AuditLog};
