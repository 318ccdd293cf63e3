//! Aggregate views over a trailing window of the audit log.
//!
//! All three views are derived from the same filtered set of entries and are
//! recomputed on every call.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use quillgate_auth::Role;
use quillgate_core::UserId;

use crate::{ActorSummary, AuditAction, AuditEntry};

pub const DEFAULT_STATS_DAYS: u32 = 7;
pub const MAX_STATS_DAYS: u32 = 365;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("days must be between 1 and {MAX_STATS_DAYS}")]
pub struct InvalidWindow;

/// Trailing window of `days` days ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    days: u32,
}

impl Default for StatsWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_STATS_DAYS,
        }
    }
}

impl StatsWindow {
    pub fn new(days: Option<u32>) -> Result<Self, InvalidWindow> {
        let days = days.unwrap_or(DEFAULT_STATS_DAYS);
        if days == 0 || days > MAX_STATS_DAYS {
            return Err(InvalidWindow);
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }

    pub fn period(&self) -> String {
        format!("{} days", self.days)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionStat {
    pub action: AuditAction,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStat {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStat {
    /// Calendar day (UTC) formatted as `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub action_stats: Vec<ActionStat>,
    pub user_stats: Vec<UserStat>,
    pub daily_stats: Vec<DailyStat>,
    pub period: String,
}

/// Group `entries` (already restricted to the window) into the three views.
///
/// - actions: descending by count, ties by action name
/// - users: descending by count, ties by email; actors missing from
///   `actors` (deleted users) are dropped
/// - days: ascending by date
pub fn compute_stats(
    entries: &[AuditEntry],
    actors: &HashMap<UserId, ActorSummary>,
    window: StatsWindow,
) -> LogStats {
    let mut by_action: HashMap<AuditAction, u64> = HashMap::new();
    let mut by_actor: HashMap<UserId, u64> = HashMap::new();
    let mut by_day: BTreeMap<String, u64> = BTreeMap::new();

    for entry in entries {
        *by_action.entry(entry.action).or_default() += 1;
        *by_actor.entry(entry.actor_id).or_default() += 1;
        *by_day
            .entry(entry.created_at.format("%Y-%m-%d").to_string())
            .or_default() += 1;
    }

    let mut action_stats: Vec<ActionStat> = by_action
        .into_iter()
        .map(|(action, count)| ActionStat { action, count })
        .collect();
    action_stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.action.as_str().cmp(b.action.as_str()))
    });

    let mut user_stats: Vec<UserStat> = by_actor
        .into_iter()
        .filter_map(|(id, count)| {
            actors.get(&id).map(|a| UserStat {
                name: a.name.clone(),
                email: a.email.clone(),
                role: a.role,
                count,
            })
        })
        .collect();
    user_stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.email.cmp(&b.email)));

    let daily_stats = by_day
        .into_iter()
        .map(|(date, count)| DailyStat { date, count })
        .collect();

    LogStats {
        action_stats,
        user_stats,
        daily_stats,
        period: window.period(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn actor(id: UserId, email: &str, role: Role) -> ActorSummary {
        ActorSummary {
            id,
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            role,
        }
    }

    #[test]
    fn window_defaults_and_bounds() {
        assert_eq!(StatsWindow::new(None).unwrap().days(), 7);
        assert_eq!(StatsWindow::new(Some(0)), Err(InvalidWindow));
        assert_eq!(StatsWindow::new(Some(366)), Err(InvalidWindow));
        assert_eq!(StatsWindow::new(Some(30)).unwrap().period(), "30 days");
    }

    #[test]
    fn window_start_is_days_before_now() {
        let now = at(2026, 3, 10, 12);
        assert_eq!(StatsWindow::new(Some(1)).unwrap().start(now), at(2026, 3, 9, 12));
    }

    #[test]
    fn groups_three_ways() {
        let admin = UserId::new();
        let editor = UserId::new();
        let gone = UserId::new();
        let actors = HashMap::from([
            (admin, actor(admin, "admin@example.com", Role::Admin)),
            (editor, actor(editor, "editor@example.com", Role::Editor)),
        ]);

        let e = |who, action, when| AuditEntry::new(who, action, Default::default(), when);
        let entries = vec![
            e(admin, AuditAction::UserLogin, at(2026, 3, 9, 8)),
            e(editor, AuditAction::UserLogin, at(2026, 3, 9, 9)),
            e(editor, AuditAction::ContentCreated, at(2026, 3, 10, 9)),
            e(editor, AuditAction::ContentUpdated, at(2026, 3, 10, 10)),
            e(gone, AuditAction::UserLogin, at(2026, 3, 8, 23)),
        ];

        let stats = compute_stats(&entries, &actors, StatsWindow::default());

        assert_eq!(
            stats.action_stats[0],
            ActionStat { action: AuditAction::UserLogin, count: 3 }
        );
        assert_eq!(stats.action_stats.len(), 3);
        // Ties ordered by name.
        assert_eq!(stats.action_stats[1].action, AuditAction::ContentCreated);

        assert_eq!(stats.user_stats.len(), 2, "deleted actor is dropped");
        assert_eq!(stats.user_stats[0].email, "editor@example.com");
        assert_eq!(stats.user_stats[0].count, 3);
        assert_eq!(stats.user_stats[1].role, Role::Admin);

        let days: Vec<(&str, u64)> = stats
            .daily_stats
            .iter()
            .map(|d| (d.date.as_str(), d.count))
            .collect();
        assert_eq!(days, vec![("2026-03-08", 1), ("2026-03-09", 2), ("2026-03-10", 2)]);
        assert_eq!(stats.period, "7 days");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let stats = compute_stats(&[], &HashMap::new(), StatsWindow::default());
        let json = serde_json::to_value(&stats).unwrap();
        for key in ["actionStats", "userStats", "dailyStats", "period"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
